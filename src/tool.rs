// src/tool.rs
use async_trait::async_trait;
use crate::error::ChatbotError;
use crate::tools::stock::{FreeformStockTool, StockReportTool, StockReporter};
use serde_json::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl McpContent {
    pub fn text(text: String) -> Self {
        Self {
            content_type: "text".to_string(),
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<McpContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<Value>,
}

impl ToolResult {
    pub fn success_with_text(text: String) -> Self {
        Self {
            content: vec![McpContent::text(text)],
            is_error: Some(false),
            raw_value: None,
        }
    }

    pub fn success_with_raw(content: Vec<McpContent>, raw: Value) -> Self {
        Self {
            content,
            is_error: Some(false),
            raw_value: Some(raw),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            content: vec![McpContent::text(format!("Error: {}", message))],
            is_error: Some(true),
            raw_value: None,
        }
    }

    /// All text content joined by blank lines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
pub trait Tool {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;

    async fn execute(&self, parameters: Value) -> Result<ToolResult, ChatbotError>;
}

/// Looks up stock tools by name.
pub struct ToolResolver {
    reporter: StockReporter,
}

impl ToolResolver {
    pub fn new(reporter: StockReporter) -> Self {
        Self { reporter }
    }

    pub fn resolve(&self, name: &str) -> Option<Box<dyn Tool + Send + Sync>> {
        match name {
            "get_stock_report" => Some(Box::new(StockReportTool::new(self.reporter.clone()))),
            "get_freeform_stock_report" => {
                Some(Box::new(FreeformStockTool::new(self.reporter.clone())))
            }
            _ => None,
        }
    }

    pub fn list_tools(&self) -> Vec<Value> {
        ["get_stock_report", "get_freeform_stock_report"]
            .iter()
            .filter_map(|name| self.resolve(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect()
    }
}
