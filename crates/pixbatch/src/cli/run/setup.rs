//! Run setup: apply CLI overrides on top of the loaded configuration.

use pixbatch_core::Config;

use super::RunArgs;

/// Merge CLI flags into `config`, then validate the result.
pub fn apply_overrides(mut config: Config, args: &RunArgs) -> anyhow::Result<Config> {
    if let Some(input) = &args.input {
        config.processing.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.processing.output_dir = output.clone();
    }
    if let Some(filter) = args.filter {
        config.processing.filter = filter.into();
    }
    if let Some(workers) = args.workers {
        config.processing.worker_count = Some(workers);
    }
    if let Some(capacity) = args.ingress_capacity {
        config.pipeline.ingress_capacity = capacity;
    }
    if let Some(capacity) = args.egress_capacity {
        config.pipeline.egress_capacity = capacity;
    }
    if let Some(sigma) = args.blur_sigma {
        config.filter.blur_sigma = sigma;
    }

    config.validate()?;

    let input_dir = config.input_dir();
    if !input_dir.is_dir() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Pass the image directory as the first argument, \
             or set processing.input_dir in the config file.",
            input_dir
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::run::types::FilterArg;
    use pixbatch_core::FilterKind;

    #[test]
    fn test_overrides_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            input: Some(dir.path().to_path_buf()),
            output: Some(dir.path().join("out")),
            filter: Some(FilterArg::Blur),
            workers: Some(3),
            egress_capacity: Some(2),
            blur_sigma: Some(0.5),
            ..RunArgs::default()
        };

        let config = apply_overrides(Config::default(), &args).unwrap();
        assert_eq!(config.processing.filter, FilterKind::Blur);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.pipeline.egress_capacity, 2);
        assert_eq!(config.pipeline.ingress_capacity, 32);
        assert_eq!(config.filter.blur_sigma, 0.5);
        assert_eq!(config.processing.output_dir, dir.path().join("out"));
    }

    #[test]
    fn test_missing_input_dir_has_hint() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            input: Some(dir.path().join("nope")),
            ..RunArgs::default()
        };
        let err = apply_overrides(Config::default(), &args).unwrap_err();
        assert!(err.to_string().contains("Hint"));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            input: Some(dir.path().to_path_buf()),
            blur_sigma: Some(-1.0),
            ..RunArgs::default()
        };
        let err = apply_overrides(Config::default(), &args).unwrap_err();
        assert!(err.to_string().contains("blur_sigma"));
    }
}
