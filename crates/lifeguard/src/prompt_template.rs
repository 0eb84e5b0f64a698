use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

use crate::models::tool::Tool;

const SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    let file_path = template_file.into();
    let template_content = fs::read_to_string(&file_path).map_err(|e| {
        TeraError::chain(format!("Failed to read template file {}", file_path.display()), e)
    })?;
    load_prompt(&template_content, context_data)
}

/// Render the system instruction for a catalog, from `template_file` if one is given
pub fn system_prompt(
    tools: &[Tool],
    template_file: Option<&PathBuf>,
) -> Result<String, TeraError> {
    let mut context = HashMap::new();
    context.insert("tools", tools);
    match template_file {
        Some(path) => load_prompt_file(path, &context),
        None => load_prompt(SYSTEM_PROMPT, &context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_prompt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("system.md");
        fs::write(&file_path, "Tools: {% for tool in tools %}{{ tool.name }} {% endfor %}").unwrap();

        let tools = vec![Tool::new("search_stores", "Find stores", json!({}))];
        let result = system_prompt(&tools, Some(&file_path)).unwrap();
        assert_eq!(result, "Tools: search_stores ");

        temp_dir.close().unwrap();
    }

    #[test]
    fn test_load_prompt_file_missing_file() {
        let file_path = PathBuf::from("non_existent_template.txt");
        let context: HashMap<String, String> = HashMap::new();

        let result = load_prompt_file(file_path, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_system_prompt_lists_tools() {
        let tools = vec![
            Tool::new("search_products", "Search the catalog.\n", json!({})),
            Tool::new("get_pricing", "Get prices", json!({})),
        ];

        let result = system_prompt(&tools, None).unwrap();
        assert!(result.contains("- search_products: Search the catalog."));
        assert!(result.contains("- get_pricing: Get prices"));
        assert!(result.contains("plain text"));
    }
}
