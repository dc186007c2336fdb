//! Instances command implementation

use crate::cli::output::{format_instances_json, format_instances_table, InstanceRow};
use crate::cli::InstancesArgs;
use crate::config::WebUiConfig;

/// Handle `gluetun-webui instances`.
///
/// Works offline: the slots are resolved from the config file and the
/// environment exactly as `serve` would resolve them.
pub fn handle_instances(args: &InstancesArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = if args.config.exists() {
        WebUiConfig::load(Some(&args.config))?
    } else {
        WebUiConfig::default()
    }
    .with_env_overrides();

    let rows: Vec<InstanceRow> = config.resolve_instances().iter().map(Into::into).collect();

    if args.json {
        Ok(format_instances_json(&rows))
    } else {
        Ok(format_instances_table(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_instances_from_config_file() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[instances.2]\nname = \"Office\"\nurl = \"http://office:8000/\"\n",
        )
        .unwrap();

        let args = InstancesArgs {
            json: true,
            config: temp.path().to_path_buf(),
        };
        let output = handle_instances(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let second = &value["instances"][1];
        assert_eq!(second["id"], "2");
        assert_eq!(second["name"], "Office");
        assert_eq!(second["url"], "http://office:8000");
        assert_eq!(second["configured"], true);
    }

    #[test]
    fn test_instances_rejects_broken_file() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[instances.2\n").unwrap();

        let args = InstancesArgs {
            json: false,
            config: temp.path().to_path_buf(),
        };
        assert!(handle_instances(&args).is_err());
    }
}
