use rmcp::{
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    schemars::{self, JsonSchema},
    tool, Error as McpError, ServerHandler,
};
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::MdTextConfig;
use crate::domain::document::ConversionService;
use crate::application::conversion_service::ConversionServiceImpl;
use crate::infrastructure::markdown::SAMPLE_MARKDOWN;
use crate::infrastructure::stats::text_stats;

/// Handler for the MCP server logic.
#[derive(Clone)]
pub struct MdTextServerHandler {
    pub conversion_service: Arc<dyn ConversionService>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConvertMarkdownArgs {
    #[schemars(description = "Markdown text to convert to plain text")]
    pub markdown: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConvertFileArgs {
    #[schemars(description = "Path to a .md, .markdown or .txt file (5MB max by default)")]
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TextStatsArgs {
    #[schemars(description = "Text to count words and characters in")]
    pub text: String,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string(value) {
        Ok(json_string) => Ok(CallToolResult::success(vec![Content::text(json_string)])),
        Err(e) => {
            log::error!("Failed to serialize tool result to JSON: {}", e);
            Err(McpError::internal_error(
                format!("Failed to serialize result: {}", e),
                None,
            ))
        }
    }
}

#[tool(tool_box)]
impl MdTextServerHandler {
    pub fn new(config: Arc<MdTextConfig>) -> Self {
        Self {
            conversion_service: Arc::new(ConversionServiceImpl::new(config)),
        }
    }

    // Runs the conversion off the async workers; large documents take a while.
    async fn convert_blocking(
        &self,
        markdown: String,
    ) -> Result<crate::domain::document::Conversion, McpError> {
        let service = self.conversion_service.clone();
        tokio::task::spawn_blocking(move || service.convert_text(&markdown))
            .await
            .map_err(|e| {
                log::error!("Conversion task failed: {}", e);
                McpError::internal_error(format!("Conversion task failed: {}", e), None)
            })
    }

    /// Converts Markdown text to plain text.
    #[tool(description = "Convert Markdown text to plain text, stripping Markdown syntax.")]
    pub async fn convert_markdown(
        &self,
        #[tool(aggr)] args: ConvertMarkdownArgs,
    ) -> Result<CallToolResult, McpError> {
        log::info!("Executing convert_markdown tool ({} bytes)", args.markdown.len());
        let conversion = self.convert_blocking(args.markdown).await?;
        Ok(CallToolResult::success(vec![Content::text(conversion.text)]))
    }

    /// Converts Markdown text and reports word and character counts for the
    /// input and the result, as JSON.
    #[tool(description = "Convert Markdown text to plain text and return JSON with the text and word/character counts.")]
    pub async fn convert_with_stats(
        &self,
        #[tool(aggr)] args: ConvertMarkdownArgs,
    ) -> Result<CallToolResult, McpError> {
        log::info!("Executing convert_with_stats tool ({} bytes)", args.markdown.len());
        let conversion = self.convert_blocking(args.markdown).await?;
        json_result(&conversion)
    }

    /// Reads a Markdown or text file and converts it to plain text.
    #[tool(description = "Read a .md, .markdown or .txt file and convert it to plain text.")]
    pub async fn convert_file(
        &self,
        #[tool(aggr)] args: ConvertFileArgs,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&args.path);
        log::info!("Executing convert_file tool for {:?}", path);
        match self.conversion_service.convert_file(&path).await {
            Ok(conversion) => Ok(CallToolResult::success(vec![Content::text(conversion.text)])),
            Err(e) => {
                log::warn!("convert_file failed: {}", e);
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "{}: {}",
                    e.title(),
                    e
                ))]))
            }
        }
    }

    /// Counts words and characters, as JSON.
    #[tool(description = "Count words, characters and non-whitespace characters in text. Returns JSON.")]
    pub async fn text_stats(
        &self,
        #[tool(aggr)] args: TextStatsArgs,
    ) -> Result<CallToolResult, McpError> {
        log::debug!("Executing text_stats tool ({} bytes)", args.text.len());
        json_result(&text_stats(&args.text))
    }

    #[tool(description = "Return a sample Markdown document that shows what the converter handles.")]
    pub async fn sample_markdown(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(SAMPLE_MARKDOWN)]))
    }
}

#[tool(tool_box)]
impl ServerHandler for MdTextServerHandler {
    fn get_info(&self) -> ServerInfo {
        log::trace!("Entering get_info method...");
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server converts Markdown to plain text and counts words and characters."
                    .into(),
            ),
        }
    }
}
