//! Chain command - apply several filters in sequence

#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{Result, Context};
use afterglow_ops::Filter;

use crate::ChainArgs;
use crate::commands::Session;

pub fn run(args: ChainArgs, session: &Session) -> Result<()> {
    let filters = parse_steps(&args.steps)?;
    info!(steps = filters.len(), "chain");
    session.process(&args.input, &args.output, &filters)
}

/// Resolves every step before any pixel is touched.
fn parse_steps(steps: &[String]) -> Result<Vec<Filter>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| Filter::parse(step).with_context(|| format!("Step {}: '{}'", i + 1, step)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_image;
    use crate::commands::tests::{session, write_input};
    use afterglow_ops::FilterKind;

    #[test]
    fn test_parse_steps_in_order() {
        let steps = ["glitch:prob=0.3".to_string(), "crt".to_string(), "kale:slices=6".to_string()];
        let kinds: Vec<_> = parse_steps(&steps).unwrap().iter().map(Filter::kind).collect();
        assert_eq!(kinds, [FilterKind::Glitch, FilterKind::Crt, FilterKind::Kaleidoscope]);
    }

    #[test]
    fn test_bad_step_is_reported_with_position() {
        let steps = ["crt".to_string(), "sepia".to_string()];
        let err = parse_steps(&steps).unwrap_err();
        assert!(err.to_string().contains("Step 2"));
        assert!(format!("{err:#}").contains("unknown filter"));
    }

    #[test]
    fn test_run_chain() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let output = dir.path().join("chain.jpg");
        let args = ChainArgs {
            input,
            output: output.clone(),
            steps: vec!["oilpaint:radius=2".into(), "neon".into(), "pixel_sort:threshold=0.5".into()],
        };
        run(args, &session()).unwrap();
        assert_eq!(load_image(&output).unwrap().dimensions(), (24, 16));
    }
}
