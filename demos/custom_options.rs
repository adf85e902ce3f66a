//! Customizing how KDL is read and written.
//!
//! Run with: cargo run --example custom_options

use kdl_doc::{
    parse_with_options, to_string_with_options, ConvertError, KdlPrintOptions, KdlReaderOptions,
    KdlValue, RegexOptions,
};
use std::error::Error;

const INPUT: &str = r#"
release (date)"2024-01-15" at=(date-time)"2024-01-15T09:00:00Z"
mirror (ipv4)"10.0.0.1" (ipv6)"::1"
pattern (regex)"^v[0-9]+$"
price 19.99 currency=(upper)"eur"
sizes (u8)16 0x20 0b1000000
"#;

/// Upper-cases annotated strings, e.g. `(upper)"eur"`.
fn upper(text: &str, _ty: &str, _options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    Ok(KdlValue::from(text.to_uppercase()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let reader_options = KdlReaderOptions::new()
        .with_prefer_decimal(true)
        .with_regex_options(RegexOptions::new().with_case_insensitive(true))
        .with_converter("upper", upper);

    let doc = parse_with_options(INPUT, &reader_options)?;

    if let Some(pattern) = doc.get("pattern").and_then(|n| n.argument(0)).and_then(|v| v.as_regex()) {
        println!("'V12' matches {}: {}", pattern, pattern.is_match("V12"));
    }
    if let Some(price) = doc.get("price").and_then(|n| n.argument(0)).and_then(|v| v.as_decimal()) {
        println!("Exact price: {}", price);
    }

    println!("\nPretty:");
    println!("{}", to_string_with_options(&doc, &KdlPrintOptions::PRETTY));

    println!("Keep radix, lowercase exponent, semicolons:");
    let options = KdlPrintOptions::PRETTY
        .with_keep_radix(true)
        .with_exponent_char('e')
        .with_semicolons(true);
    println!("{}", to_string_with_options(&doc, &options));

    println!("Escaped non-ASCII with tabs:");
    let options = KdlPrintOptions::RAW
        .with_indent('\t', 1)
        .with_escape_non_ascii(true);
    println!("{}", to_string_with_options(&doc, &options));

    Ok(())
}
