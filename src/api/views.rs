//! Server-rendered HTML for the index, active and USDT pages.

use super::models::Flash;
use crate::models::{ActivePairSummary, TradingPairRecord};
use std::fmt::Write;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut messages = String::new();
    for flash in flashes {
        let _ = writeln!(
            messages,
            r#"<div class="flash {}">{}</div>"#,
            flash.level.css_class(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; }}
.flash {{ padding: 0.5rem; margin-bottom: 1rem; }}
.flash.success {{ background: #e6f4ea; }}
.flash.error {{ background: #fce8e6; }}
</style>
</head>
<body>
<nav><a href="/">Stored pairs</a> | <a href="/refresh">Refresh</a> | <a href="/active">Active pairs</a> | <a href="/usdt">USDT pairs</a></nav>
<h1>{title}</h1>
{messages}{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut html = String::from("<table>\n<tr>");
    for h in headers {
        let _ = write!(html, "<th>{}</th>", escape(h));
    }
    html.push_str("</tr>\n");

    let mut empty = true;
    for row in rows {
        empty = false;
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(&cell));
        }
        html.push_str("</tr>\n");
    }
    if empty {
        let _ = writeln!(html, r#"<tr><td colspan="{}">No pairs.</td></tr>"#, headers.len());
    }
    html.push_str("</table>");
    html
}

pub fn futures_page(pairs: &[TradingPairRecord], total: i64, flashes: &[Flash]) -> String {
    let mut body = format!("<p>Showing {} of {total} stored pairs.</p>\n", pairs.len());
    body += &table(
        &["Pair", "Kind", "Status", "Tick size", "Price band upper"],
        pairs.iter().map(|p| {
            vec![
                p.pair.clone(),
                p.kind.clone(),
                p.status.clone(),
                p.tick_size.to_string(),
                p.price_band_upper.clone(),
            ]
        }),
    );
    layout("Futures Pairs", flashes, &body)
}

pub fn active_pairs_page(pairs: &[ActivePairSummary]) -> String {
    let body = table(
        &["Pair", "Base", "Quote", "Last price", "24h volume"],
        pairs.iter().map(|p| {
            vec![
                p.pair.clone(),
                p.base_currency.clone(),
                p.quote_currency.clone(),
                p.last_price.clone(),
                p.volume_24h.clone(),
            ]
        }),
    );
    layout("Active Futures Pairs", &[], &body)
}

pub fn usdt_pairs_page(pairs: &[ActivePairSummary]) -> String {
    let body = table(
        &["Pair", "Base", "Last price", "24h high", "24h low", "24h volume"],
        pairs.iter().map(|p| {
            vec![
                p.pair.clone(),
                p.base_currency.clone(),
                p.last_price.clone(),
                p.high_24h.clone(),
                p.low_24h.clone(),
                p.volume_24h.clone(),
            ]
        }),
    );
    layout("USDT Futures Pairs", &[], &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::FlashLevel;

    #[test]
    fn escapes_upstream_text() {
        assert_eq!(escape(r#"<b>"x" & 'y'</b>"#), "&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/b&gt;");
    }

    #[test]
    fn futures_page_renders_rows_and_flashes() {
        let html = futures_page(
            &[TradingPairRecord {
                pair: "BTCUSDT".into(),
                kind: "perpetual".into(),
                status: "active".into(),
                tick_size: 0.5,
                price_band_upper: "70000".into(),
            }],
            1,
            &[Flash {
                level: FlashLevel::Error,
                message: "Error refreshing data: <boom>".into(),
            }],
        );

        assert!(html.contains("Showing 1 of 1 stored pairs."));
        assert!(html.contains("<td>BTCUSDT</td>"));
        assert!(html.contains("<td>0.5</td>"));
        assert!(html.contains(r#"<div class="flash error">Error refreshing data: &lt;boom&gt;</div>"#));
    }

    #[test]
    fn empty_table_says_so() {
        assert!(usdt_pairs_page(&[]).contains(r#"<td colspan="6">No pairs.</td>"#));
    }
}
