use chrono::Utc;
use std::fmt::Write as _;

use crate::config::{Highlight, Locale};
use crate::pipeline::TableState;
use crate::table::{RateClass, Row};

const HIGH_COLOR: &str = "#abffbd";
const LOW_COLOR: &str = "#ff9e9e";

/// Stable id of the table body the rows land in.
pub const TBODY_ID: &str = "pop-tbody";
/// Placeholder for missing employment counts and rates.
pub const MISSING: &str = "—";

/// Escape text for HTML.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

impl Locale {
    fn group_sep(self) -> char {
        match self {
            // fi-FI groups with a non-breaking space
            Locale::Fi => '\u{a0}',
            Locale::En => ',',
        }
    }

    fn decimal_sep(self) -> char {
        match self {
            Locale::Fi => ',',
            Locale::En => '.',
        }
    }

    fn lang_tag(self) -> &'static str {
        match self {
            Locale::Fi => "fi",
            Locale::En => "en",
        }
    }
}

/// Format a count as a locale-grouped integer, no decimals. Non-finite input
/// is a missing observation and renders as the [`MISSING`] placeholder,
/// never as a number.
pub fn fmt_int(locale: Locale, v: f64) -> String {
    if !v.is_finite() {
        return MISSING.to_string();
    }
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && i % 3 == lead % 3 {
            out.push(locale.group_sep());
        }
        out.push(ch);
    }
    out
}

/// Format an employment rate with exactly two decimals and a trailing `%`.
pub fn fmt_rate(locale: Locale, rate: f64) -> String {
    let mut s = format!("{:.2}", rate);
    if locale.decimal_sep() != '.' {
        s = s.replace('.', ",");
    }
    s.push('%');
    s
}

fn row_color(class: Option<RateClass>) -> Option<&'static str> {
    match class {
        Some(RateClass::High) => Some(HIGH_COLOR),
        Some(RateClass::Low) => Some(LOW_COLOR),
        _ => None,
    }
}

fn push_td(buf: &mut String, text: &str, right: bool, bg: Option<&str>) {
    let mut style = String::new();
    if right {
        style.push_str("text-align:right");
    }
    if let Some(color) = bg {
        if !style.is_empty() {
            style.push(';');
        }
        let _ = write!(style, "background-color:{}", color);
    }
    if style.is_empty() {
        let _ = write!(buf, "<td>{}</td>", text);
    } else {
        let _ = write!(buf, "<td style=\"{}\">{}</td>", style, text);
    }
}

/// Render joined rows as tbody inner HTML: name, population, employment,
/// rate. Missing employment/rate cells show [`MISSING`]. High/low rows are
/// marked per the highlight strategy; the inline strategy colors the row and
/// every cell, the css-class strategy only tags the row.
pub fn render_rows(rows: &[Row], locale: Locale, highlight: Highlight) -> String {
    let mut buf = String::with_capacity(rows.len() * 128);
    for row in rows {
        let color = row_color(row.class);
        match (highlight, color) {
            (Highlight::InlineColor, Some(c)) => {
                let _ = write!(buf, "<tr style=\"background-color:{}\">", c);
            }
            (Highlight::CssClass, Some(_)) => {
                let class = match row.class {
                    Some(RateClass::High) => "rate-high",
                    _ => "rate-low",
                };
                let _ = write!(buf, "<tr class=\"{}\">", class);
            }
            _ => buf.push_str("<tr>"),
        }

        let cell_bg = match highlight {
            Highlight::InlineColor => color,
            Highlight::CssClass => None,
        };
        push_td(&mut buf, &esc(&row.name), false, cell_bg);
        push_td(&mut buf, &fmt_int(locale, row.population), true, cell_bg);
        let emp = match row.employment {
            Some(e) => fmt_int(locale, e),
            None => MISSING.to_string(),
        };
        push_td(&mut buf, &emp, true, cell_bg);
        let rate = match row.rate {
            Some(r) => fmt_rate(locale, r),
            None => MISSING.to_string(),
        };
        push_td(&mut buf, &rate, true, cell_bg);

        buf.push_str("</tr>\n");
    }
    buf
}

/// Render the terminal-failure body: one row, one cell spanning all four
/// columns, carrying the error message.
pub fn render_error_row(msg: &str) -> String {
    format!("<tr><td colspan=\"4\">{}</td></tr>\n", esc(msg))
}

fn headers(locale: Locale) -> [&'static str; 4] {
    match locale {
        Locale::Fi => ["Alue", "Väkiluku", "Työlliset", "Työllisyysaste"],
        Locale::En => ["Region", "Population", "Employed", "Employment rate"],
    }
}

/// Produce the complete HTML document for a pipeline outcome. Every call
/// builds the document from scratch, so re-rendering fully replaces prior
/// content.
pub fn render_page(state: &TableState, locale: Locale, highlight: Highlight) -> String {
    let tbody = match state {
        TableState::Full(rows) | TableState::PopulationOnly(rows) => {
            render_rows(rows, locale, highlight)
        }
        TableState::Failed(msg) => render_error_row(msg),
    };

    let mut buf = String::with_capacity(tbody.len() + 2048);
    let _ = write!(
        buf,
        "<!doctype html><html lang=\"{}\"><head><meta charset=\"utf-8\">\
         <title>Regional employment</title>\
         <style>\
         body{{font-family:system-ui,sans-serif;margin:24px}}\
         table{{border-collapse:collapse}}\
         td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
         .muted{{opacity:0.8}}",
        locale.lang_tag(),
    );
    if highlight == Highlight::CssClass {
        let _ = write!(
            buf,
            ".rate-high,.rate-high td{{background-color:{}}}\
             .rate-low,.rate-low td{{background-color:{}}}",
            HIGH_COLOR, LOW_COLOR,
        );
    }
    buf.push_str("</style></head><body>");

    let [h1, h2, h3, h4] = headers(locale);
    let _ = write!(
        buf,
        "<table><thead><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead>\
         <tbody id=\"{}\">\n{}</tbody></table>",
        h1, h2, h3, h4, TBODY_ID, tbody,
    );

    let _ = write!(
        buf,
        "<p class=\"muted\">Generated {}</p></body></html>",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );
    buf
}
