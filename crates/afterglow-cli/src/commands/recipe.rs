//! Recipe command - apply the steps listed in a YAML file
//!
//! A recipe is either a bare list of steps or a mapping with a `steps` key.
//! Each step is a chain string or a `filter`/`params` table:
//!
//! ```yaml
//! steps:
//!   - oilpaint:radius=3
//!   - filter: glitch
//!     params:
//!       prob: 0.3
//!       aberration: false
//!   - filter: crt
//! ```

use std::collections::BTreeMap;
use std::path::Path;

#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{Result, Context, bail};
use afterglow_ops::{Filter, FilterKind};
use serde::Deserialize;

use crate::RecipeArgs;
use crate::commands::Session;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recipe {
    List(Vec<Step>),
    Document { steps: Vec<Step> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Chain(String),
    Table {
        filter: String,
        #[serde(default)]
        params: BTreeMap<String, serde_yaml::Value>,
    },
}

pub fn run(args: RecipeArgs, session: &Session) -> Result<()> {
    let filters = load_recipe(&args.recipe)?;
    info!(recipe = %args.recipe.display(), steps = filters.len(), "recipe");
    session.process(&args.input, &args.output, &filters)
}

fn load_recipe(path: &Path) -> Result<Vec<Filter>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe: {}", path.display()))?;
    parse_recipe(&text).with_context(|| format!("Invalid recipe: {}", path.display()))
}

fn parse_recipe(yaml: &str) -> Result<Vec<Filter>> {
    let steps = match serde_yaml::from_str::<Recipe>(yaml)? {
        Recipe::List(steps) | Recipe::Document { steps } => steps,
    };
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| resolve(step).with_context(|| format!("Step {}", i + 1)))
        .collect()
}

fn resolve(step: &Step) -> Result<Filter> {
    match step {
        Step::Chain(text) => Ok(Filter::parse(text)?),
        Step::Table { filter, params } => {
            let kind: FilterKind = filter.parse()?;
            let values = params
                .iter()
                .map(|(key, value)| Ok((key.as_str(), scalar(key, value)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Filter::from_pairs(
                kind,
                values.iter().map(|(key, value)| (*key, value.as_str())),
            )?)
        }
    }
}

/// Renders a YAML scalar the way it would be written in a chain step.
fn scalar(key: &str, value: &serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("none".to_string()),
        _ => bail!("Parameter '{}' must be a scalar", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_image;
    use crate::commands::tests::{session, write_input};
    use afterglow_ops::{GlitchParams, ReactionDiffusionParams};

    #[test]
    fn test_document_with_mixed_steps() {
        let yaml = "
steps:
  - oilpaint:radius=3
  - filter: glitch
    params:
      prob: 0.3
      aberration: false
  - filter: crt
";
        let filters = parse_recipe(yaml).unwrap();
        let kinds: Vec<_> = filters.iter().map(Filter::kind).collect();
        assert_eq!(kinds, [FilterKind::OilPaint, FilterKind::Glitch, FilterKind::Crt]);
        assert_eq!(
            filters[1],
            Filter::Glitch(GlitchParams { prob: 0.3, aberration: false, ..Default::default() })
        );
    }

    #[test]
    fn test_bare_list() {
        let filters = parse_recipe("- halftone\n- filter: neon\n").unwrap();
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_null_clears_optional() {
        let yaml = "- filter: react_diff\n  params:\n    tolerance: ~\n    steps: 10\n";
        let filters = parse_recipe(yaml).unwrap();
        assert_eq!(
            filters[0],
            Filter::ReactDiff(ReactionDiffusionParams { steps: 10, ..Default::default() })
        );
    }

    #[test]
    fn test_nested_value_rejected() {
        let yaml = "- filter: crt\n  params:\n    vignette: [1, 2]\n";
        let err = parse_recipe(yaml).unwrap_err();
        assert!(format!("{err:#}").contains("vignette"));
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let err = parse_recipe("- filter: sepia\n").unwrap_err();
        assert!(format!("{err:#}").contains("Step 1"));
    }

    #[test]
    fn test_run_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let recipe = dir.path().join("look.yaml");
        std::fs::write(&recipe, "steps:\n  - kaleidoscope:slices=4\n  - filter: glow\n    params: {threshold: 0.5}\n").unwrap();
        let output = dir.path().join("look.png");
        let args = RecipeArgs {
            recipe,
            input,
            output: output.clone(),
        };
        run(args, &session()).unwrap();
        assert_eq!(load_image(&output).unwrap().dimensions(), (24, 16));
    }
}
