//! Parser for the ECB `eurofxref` feed
//!
//! The document looks like:
//!
//! ```xml
//! <gesmes:Envelope xmlns:gesmes="..." xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
//!   <Cube>
//!     <Cube time="2024-05-17">
//!       <Cube currency="USD" rate="1.0866"/>
//!       <Cube currency="JPY" rate="169.12"/>
//!     </Cube>
//!   </Cube>
//! </gesmes:Envelope>
//! ```
//!
//! Only `Cube` elements bound to the configured namespace are considered. The
//! first `Cube[@time]` nested in another `Cube` provides the as-of date and its
//! direct `Cube[@currency][@rate]` children provide the rates.

use crate::core::outcome::{Outcome, StageError};
use crate::core::snapshot::Rates;
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

const CUBE: &[u8] = b"Cube";

fn malformed(e: impl std::fmt::Display) -> StageError {
    StageError::Parse(format!("Feed is not well-formed XML: {e}"))
}

fn attribute(element: &BytesStart, name: &str) -> Outcome<Option<String>> {
    let Some(attr) = element.try_get_attribute(name).map_err(malformed)? else {
        return Ok(None);
    };
    let value = std::str::from_utf8(&attr.value).map_err(malformed)?;
    Ok(Some(value.trim().to_string()))
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[derive(Default)]
struct FeedState {
    as_of: Option<NaiveDate>,
    // Depth of the open time cube, while it is open
    time_cube_depth: Option<usize>,
    rates: Rates,
}

impl FeedState {
    /// Handles a namespaced `Cube` at `depth` whose parent may or may not be a `Cube`.
    fn visit_cube(
        &mut self,
        element: &BytesStart,
        depth: usize,
        parent_is_cube: bool,
        has_children: bool,
    ) -> Outcome<()> {
        if let Some(time_depth) = self.time_cube_depth {
            if depth == time_depth + 1 {
                self.visit_rate(element)?;
            }
            return Ok(());
        }

        if self.as_of.is_some() || !parent_is_cube {
            return Ok(());
        }

        if let Some(time) = attribute(element, "time")? {
            let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d").map_err(|e| {
                StageError::Parse(format!("Invalid as-of date '{time}' in feed: {e}"))
            })?;
            debug!("Feed as-of date: {}", date);
            self.as_of = Some(date);
            if has_children {
                self.time_cube_depth = Some(depth);
            }
        }
        Ok(())
    }

    fn visit_rate(&mut self, element: &BytesStart) -> Outcome<()> {
        let (Some(currency), Some(rate)) =
            (attribute(element, "currency")?, attribute(element, "rate")?)
        else {
            return Ok(());
        };

        if !is_currency_code(&currency) {
            warn!("Skipping entry with invalid currency code '{}'", currency);
            return Ok(());
        }
        match Decimal::from_str(&rate) {
            Ok(value) => {
                self.rates.insert(currency, value);
            }
            Err(e) => warn!("Skipping {} with invalid rate '{}': {}", currency, rate, e),
        }
        Ok(())
    }

    fn close(&mut self, depth: usize) {
        if self.time_cube_depth == Some(depth) {
            self.time_cube_depth = None;
        }
    }
}

/// Extracts the as-of date and the currency to rate mapping from a feed document.
///
/// Fails with [`StageError::Parse`] when the markup is not well-formed or when no
/// dated `Cube` exists in `namespace`. An empty rate set is a valid result.
pub fn parse_feed(document: &str, namespace: &str) -> Outcome<(NaiveDate, Rates)> {
    let mut reader = NsReader::from_str(document);
    reader.config_mut().trim_text(true);

    let namespace = namespace.as_bytes();
    // One entry per open element: whether it is a namespaced Cube
    let mut open: Vec<bool> = Vec::new();
    let mut seen_root = false;
    let mut state = FeedState::default();

    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(malformed)?;
        let in_namespace = matches!(resolved, ResolveResult::Bound(Namespace(ns)) if ns == namespace);

        match event {
            Event::Start(e) => {
                seen_root = true;
                let is_cube = in_namespace && e.local_name().as_ref() == CUBE;
                let parent_is_cube = open.last().copied().unwrap_or(false);
                open.push(is_cube);
                if is_cube {
                    state.visit_cube(&e, open.len(), parent_is_cube, true)?;
                }
            }
            Event::Empty(e) => {
                seen_root = true;
                if in_namespace && e.local_name().as_ref() == CUBE {
                    let parent_is_cube = open.last().copied().unwrap_or(false);
                    state.visit_cube(&e, open.len() + 1, parent_is_cube, false)?;
                }
            }
            Event::End(_) => {
                state.close(open.len());
                if open.pop().is_none() {
                    return Err(malformed("unexpected closing tag"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(malformed("document has no root element"));
    }
    if !open.is_empty() {
        return Err(malformed("unexpected end of document"));
    }

    let as_of = state.as_of.ok_or_else(|| {
        StageError::Parse("Unexpected feed structure: no dated Cube element found".to_string())
    })?;
    debug!("Parsed {} rates for {}", state.rates.len(), as_of);
    Ok((as_of, state.rates))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.ecb.int/vocabulary/2002-08-01/eurofxref";

    fn feed(cubes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="{NS}">
    <gesmes:subject>Reference rates</gesmes:subject>
    <gesmes:Sender>
        <gesmes:name>European Central Bank</gesmes:name>
    </gesmes:Sender>
    <Cube>
{cubes}
    </Cube>
</gesmes:Envelope>"#
        )
    }

    #[test]
    fn test_parses_date_and_rates() {
        let document = feed(
            r#"<Cube time='2024-05-17'>
                <Cube currency='USD' rate='1.0866'/>
                <Cube currency='JPY' rate='169.12'/>
                <Cube currency='GBP' rate='0.85540'/>
            </Cube>"#,
        );

        let (date, rates) = parse_feed(&document, NS).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["USD"], Decimal::from_str("1.0866").unwrap());
        assert_eq!(rates["JPY"].to_string(), "169.12");
        // Trailing zeros survive: no float conversion
        assert_eq!(rates["GBP"].to_string(), "0.85540");
    }

    #[test]
    fn test_dated_cube_without_rates_is_valid() {
        let document = feed("<Cube time='2024-05-17'></Cube>");
        let (date, rates) = parse_feed(&document, NS).unwrap();
        assert_eq!(date.to_string(), "2024-05-17");
        assert!(rates.is_empty());

        let document = feed("<Cube time='2024-05-17'/>");
        let (_, rates) = parse_feed(&document, NS).unwrap();
        assert!(rates.is_empty());
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let document = feed(
            r#"<Cube time='2024-05-17'>
                <Cube currency='USD' rate='1.0866'/>
                <Cube currency='usd' rate='1.0'/>
                <Cube currency='CHF' rate='n/a'/>
                <Cube currency='SEK'/>
            </Cube>"#,
        );

        let (_, rates) = parse_feed(&document, NS).unwrap();
        assert_eq!(rates.keys().collect::<Vec<_>>(), vec!["USD"]);
    }

    #[test]
    fn test_missing_structure_is_a_parse_failure() {
        let document = feed("<Cube currency='USD' rate='1.0866'/>");
        let err = parse_feed(&document, NS).unwrap_err();
        assert_eq!(err.stage(), "parse");
        assert!(err.to_string().contains("Unexpected feed structure"));
    }

    #[test]
    fn test_time_cube_must_be_nested_in_cube() {
        let document = format!(
            r#"<Envelope xmlns="{NS}"><Cube time='2024-05-17'><Cube currency='USD' rate='1.0'/></Cube></Envelope>"#
        );
        let err = parse_feed(&document, NS).unwrap_err();
        assert!(err.to_string().contains("Unexpected feed structure"));
    }

    #[test]
    fn test_wrong_namespace_is_a_parse_failure() {
        let document = feed("<Cube time='2024-05-17'><Cube currency='USD' rate='1.0866'/></Cube>");
        let err = parse_feed(&document, "urn:some-other-namespace").unwrap_err();
        assert!(err.to_string().contains("Unexpected feed structure"));
    }

    #[test]
    fn test_malformed_markup_is_a_parse_failure() {
        let err = parse_feed("<Envelope><Cube></Envelope>", NS).unwrap_err();
        assert_eq!(err.stage(), "parse");
        assert!(err.to_string().contains("not well-formed"));

        let err = parse_feed("<Envelope><Cube>", NS).unwrap_err();
        assert!(err.to_string().contains("not well-formed"));

        let err = parse_feed("just some text", NS).unwrap_err();
        assert!(err.to_string().contains("not well-formed"));
    }

    #[test]
    fn test_invalid_as_of_date() {
        let document = feed("<Cube time='17/05/2024'><Cube currency='USD' rate='1.0'/></Cube>");
        let err = parse_feed(&document, NS).unwrap_err();
        assert!(err.to_string().contains("Invalid as-of date '17/05/2024'"));
    }

    #[test]
    fn test_only_first_dated_cube_is_used() {
        let document = feed(
            r#"<Cube time='2024-05-17'><Cube currency='USD' rate='1.0866'/></Cube>
               <Cube time='2024-05-16'><Cube currency='USD' rate='1.0855'/><Cube currency='JPY' rate='168.0'/></Cube>"#,
        );
        let (date, rates) = parse_feed(&document, NS).unwrap();
        assert_eq!(date.to_string(), "2024-05-17");
        assert_eq!(rates.len(), 1);
        assert_eq!(rates["USD"].to_string(), "1.0866");
    }
}
