use std::path::Path;

use crate::scenario::types::Scenario;
use crate::{Result, RukiteError};

/// JSON 场景文件加载器
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// 从文件路径加载
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Scenario> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_content(&content).map_err(|e| match e {
            RukiteError::ParseError(msg) => {
                RukiteError::ParseError(format!("{}: {}", path.as_ref().display(), msg))
            }
            other => other,
        })
    }

    /// 从字符串内容解析
    pub fn parse_content(content: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_json::from_str(content)
            .map_err(|e| RukiteError::ParseError(format!("invalid scenario: {}", e)))?;

        if scenario.commands.is_empty() {
            return Err(RukiteError::ParseError(
                "scenario has no commands".to_string(),
            ));
        }

        for (index, command) in scenario.commands.iter().enumerate() {
            if command.uri.trim().is_empty() {
                return Err(RukiteError::ParseError(format!(
                    "command #{} ({}) has an empty uri",
                    index + 1,
                    command.label()
                )));
            }
        }

        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str = r#"
{
  "description": "User lifecycle",
  "variables": { "userName": "alice" },
  "commands": [
    {
      "name": "create",
      "verb": "POST",
      "uri": "/users",
      "body": { "name": "{{userName}}" }
    },
    {
      "verb": "GET",
      "uri": "{{location:create}}",
      "checks": [
        { "description": "name", "field": "$.name", "operator": "equals", "expected": "alice" }
      ]
    }
  ]
}
"#;

    #[test]
    fn test_parse_content() {
        let scenario = ScenarioLoader::parse_content(SCENARIO).unwrap();
        assert_eq!(scenario.description.as_deref(), Some("User lifecycle"));
        assert_eq!(scenario.variables.get("userName").unwrap(), "alice");
        assert_eq!(scenario.commands.len(), 2);
        assert_eq!(scenario.commands[1].checks.len(), 1);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();
        file.flush().unwrap();

        let scenario = ScenarioLoader::load_file(file.path()).unwrap();
        assert_eq!(scenario.commands[0].name.as_deref(), Some("create"));
    }

    #[test]
    fn test_rejects_empty_scenario() {
        let err = ScenarioLoader::parse_content(r#"{"commands": []}"#).unwrap_err();
        assert!(err.to_string().contains("no commands"));
    }

    #[test]
    fn test_rejects_missing_verb() {
        let result = ScenarioLoader::parse_content(r#"{"commands": [{"uri": "/a"}]}"#);
        assert!(matches!(result, Err(RukiteError::ParseError(_))));
    }

    #[test]
    fn test_rejects_empty_uri() {
        let err =
            ScenarioLoader::parse_content(r#"{"commands": [{"verb": "GET", "uri": " "}]}"#)
                .unwrap_err();
        assert!(err.to_string().contains("empty uri"));
    }
}
