//! Text rendering of lookup results.
//!
//! A result is shown in exactly one of four view states. Sites that could
//! not be searched are alerts in every view: they go to the error writer
//! with an `error:` prefix and never appear in the informational output.

use std::io::{self, Write};
use std::process::ExitCode;

use skuscan_core::{ComparisonResult, LookupOutcome, MatchTier};

pub(crate) enum View<'a> {
    /// Blank input; nothing was searched.
    NoInput,
    /// Every site answered and none confirmed a product.
    NoMatch(&'a ComparisonResult),
    /// No site could be searched at all.
    Failed(&'a ComparisonResult),
    Found(&'a ComparisonResult),
}

impl<'a> View<'a> {
    pub(crate) fn of(result: &'a ComparisonResult) -> Self {
        if result.primary().is_some() {
            View::Found(result)
        } else if result.all_failed() {
            View::Failed(result)
        } else {
            View::NoMatch(result)
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            View::Found(_) | View::NoMatch(_) => ExitCode::SUCCESS,
            View::Failed(_) => ExitCode::from(1),
            View::NoInput => ExitCode::from(2),
        }
    }
}

pub(crate) fn write_text(view: &View<'_>, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    match view {
        View::NoInput => writeln!(err, "warning: enter or scan a product code first"),
        View::NoMatch(result) => {
            write_no_match(result, out)?;
            write_site_errors(result, err)
        }
        View::Failed(result) => {
            writeln!(
                err,
                "error: could not search any catalog for \"{}\"",
                result.identifier
            )?;
            write_site_errors(result, err)
        }
        View::Found(result) => {
            write_found(result, out)?;
            write_site_errors(result, err)
        }
    }
}

fn write_found(result: &ComparisonResult, out: &mut impl Write) -> io::Result<()> {
    let Some(record) = result.primary() else {
        return Ok(());
    };
    let Some(details) = record.details() else {
        return Ok(());
    };

    writeln!(out, "{}", details.title)?;
    writeln!(out, "  Price:      {}", details.price)?;
    writeln!(out, "  Model:      {}", details.model)?;
    if let Some(image) = &details.image_url {
        writeln!(out, "  Image:      {image}")?;
    }
    writeln!(out, "  Source:     {}", record.source)?;
    writeln!(out, "  URL:        {}", record.url)?;
    writeln!(out, "  Matched by: {}", tier_label(details.matched_by))?;

    if result.records.iter().filter(|r| !r.is_error()).count() > 1 {
        writeln!(out)?;
        write_price_table(result, out)?;
    }
    Ok(())
}

/// Price rows for the sites that were searched; errored sites are left out.
fn write_price_table(result: &ComparisonResult, out: &mut impl Write) -> io::Result<()> {
    let rows: Vec<_> = result
        .price_table()
        .into_iter()
        .zip(&result.records)
        .filter(|(_, record)| !record.is_error())
        .map(|(row, _)| row)
        .collect();
    let width = rows
        .iter()
        .map(|row| row.source.chars().count())
        .max()
        .unwrap_or(0);

    writeln!(out, "Prices:")?;
    for row in &rows {
        let cell = row.price.as_deref().unwrap_or("not found");
        let marker = if row.cheapest { "  <- cheapest" } else { "" };
        writeln!(out, "  {:<width$}  {cell}{marker}", row.source)?;
    }
    Ok(())
}

fn write_no_match(result: &ComparisonResult, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "No exact match for \"{}\".", result.identifier)?;
    writeln!(out, "Search manually:")?;
    for record in result.records.iter().filter(|r| !r.is_error()) {
        writeln!(out, "  {}: {}", record.source, record.url)?;
    }
    Ok(())
}

/// One `error:` line per site that could not be searched, with its search
/// URL as a manual fallback.
fn write_site_errors(result: &ComparisonResult, err: &mut impl Write) -> io::Result<()> {
    for record in &result.records {
        if let LookupOutcome::Error { kind, message } = &record.outcome {
            writeln!(err, "error: {}: {kind} fault: {message}", record.source)?;
            writeln!(err, "  search manually: {}", record.url)?;
        }
    }
    Ok(())
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Model => "model field",
        MatchTier::Title => "title",
        MatchTier::Url => "product URL",
        MatchTier::Body => "page text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skuscan_core::{ExtractedRecord, FaultKind, Identifier, ProductDetails};

    fn found(source: &str, price: &str) -> ExtractedRecord {
        ExtractedRecord::found(
            source,
            format!("https://{}.example/products/roger", source.to_lowercase()),
            ProductDetails {
                title: "The Roger Pro".to_owned(),
                price: price.to_owned(),
                model: "48.98721".to_owned(),
                image_url: Some("https://cdn.example/roger.jpg".to_owned()),
                matched_by: MatchTier::Model,
            },
        )
    }

    fn failed(source: &str) -> ExtractedRecord {
        ExtractedRecord::error(
            source,
            format!("https://{}.example/search?q=48.98721", source.to_lowercase()),
            FaultKind::Transport,
            "operation timed out".to_owned(),
        )
    }

    fn result(records: Vec<ExtractedRecord>) -> ComparisonResult {
        ComparisonResult::new(Identifier::new("48.98721").unwrap(), records)
    }

    fn render(view: &View<'_>) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_text(view, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn found_view_shows_fields_and_price_table() {
        let result = result(vec![
            failed("Innvictus"),
            found("Depofit", "MXN 3,299.00"),
            found("Other", "MXN 3,499.00"),
        ]);
        let view = View::of(&result);
        assert!(matches!(view, View::Found(_)));

        let (out, err) = render(&view);
        assert!(out.starts_with("The Roger Pro\n"));
        assert!(out.contains("Price:      MXN 3,299.00"));
        assert!(out.contains("Source:     Depofit"));
        assert!(out.contains("Matched by: model field"));
        assert!(out.contains("Depofit  MXN 3,299.00  <- cheapest"));
        assert!(!out.contains("3,499.00  <- cheapest"));
        assert!(!out.contains("Innvictus"));
        assert!(err.contains("error: Innvictus: transport fault: operation timed out"));
    }

    #[test]
    fn single_source_found_view_has_no_price_table() {
        let result = result(vec![found("Depofit", "MXN 3,299.00")]);
        let (out, _) = render(&View::of(&result));
        assert!(!out.contains("Prices:"));
    }

    #[test]
    fn no_match_view_lists_manual_search_links() {
        let result = result(vec![
            ExtractedRecord::not_found(
                "Depofit",
                "https://depofit.com/search?q=48.98721&type=product".to_owned(),
            ),
            ExtractedRecord::not_found(
                "Innvictus",
                "https://www.innvictus.com/search?q=48.98721".to_owned(),
            ),
        ]);
        let view = View::of(&result);
        assert!(matches!(view, View::NoMatch(_)));

        let (out, err) = render(&view);
        assert!(err.is_empty());
        assert!(out.contains("No exact match for \"48.98721\"."));
        assert!(out.contains("Depofit: https://depofit.com/search?q=48.98721&type=product"));
        assert!(out.contains("Innvictus: https://www.innvictus.com/search?q=48.98721"));
    }

    #[test]
    fn errored_site_in_no_match_view_is_an_alert() {
        let result = result(vec![
            failed("Depofit"),
            ExtractedRecord::not_found(
                "Innvictus",
                "https://www.innvictus.com/search?q=48.98721".to_owned(),
            ),
        ]);
        let view = View::of(&result);
        assert!(matches!(view, View::NoMatch(_)));

        let (out, err) = render(&view);
        assert!(out.contains("No exact match for \"48.98721\"."));
        assert!(out.contains("Innvictus: https://www.innvictus.com/search?q=48.98721"));
        assert!(!out.contains("Depofit"));
        assert!(!out.contains("error"));
        assert!(err.starts_with("error: Depofit: transport fault: operation timed out\n"));
        assert!(err.contains("search manually: https://depofit.example/search?q=48.98721"));
    }

    #[test]
    fn failed_view_writes_errors_to_stderr() {
        let result = result(vec![failed("Depofit"), failed("Innvictus")]);
        let view = View::of(&result);
        assert!(matches!(view, View::Failed(_)));

        let (out, err) = render(&view);
        assert!(out.is_empty());
        assert!(err.lines().all(|line| line.starts_with("error:") || line.starts_with("  ")));
        assert!(err.contains("error: Depofit: transport fault: operation timed out"));
    }

    #[test]
    fn no_input_view_is_a_warning() {
        let (out, err) = render(&View::NoInput);
        assert!(out.is_empty());
        assert!(err.starts_with("warning:"));
    }
}
