//! List command - print the filter table and parameter schemas

use std::fmt::Write;

use anyhow::Result;
use afterglow_ops::FilterKind;

use crate::ListArgs;

pub fn run(args: ListArgs) -> Result<()> {
    let text = match args.filter {
        Some(name) => describe(name.parse()?),
        None => overview(),
    };
    print!("{text}");
    Ok(())
}

fn overview() -> String {
    let mut out = String::new();
    for kind in FilterKind::ALL {
        let _ = writeln!(out, "{:<14} {}", kind.name(), kind.summary());
    }
    let _ = writeln!(out, "\nRun `afterglow list <filter>` for parameters.");
    out
}

fn describe(kind: FilterKind) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", kind.name(), kind.summary());
    if !kind.aliases().is_empty() {
        let _ = writeln!(out, "aliases: {}", kind.aliases().join(", "));
    }
    let _ = writeln!(out);
    for param in kind.schema() {
        let _ = writeln!(
            out,
            "  {:<18} {:<10} {:<12} {}",
            param.name,
            param.kind.to_string(),
            format!("[{}]", param.default),
            param.help
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_lists_every_filter() {
        let text = overview();
        for kind in FilterKind::ALL {
            assert!(text.contains(kind.name()));
        }
    }

    #[test]
    fn test_describe_shows_schema() {
        let text = describe(FilterKind::PixelSort);
        assert!(text.contains("aliases: pixel-sort, sort"));
        assert!(text.contains("{row,col}"));
        assert!(text.contains("[0.7]"));
    }

    #[test]
    fn test_kaleidoscope_radius_help_matches_warp() {
        let text = describe(FilterKind::Kaleidoscope);
        assert!(text.contains("shorter half-side"));
    }

    #[test]
    fn test_unknown_filter() {
        let args = ListArgs {
            filter: Some("sepia".into()),
        };
        assert!(run(args).is_err());
    }
}
