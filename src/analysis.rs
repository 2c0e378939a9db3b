//! Analysis collaborator -- turns profiling output into natural-language
//! suggestions via an Ollama-compatible generate endpoint.
//!
//! Remote failures are embedded in the returned text instead of raised, so a
//! dead endpoint never aborts an invocation that already has profiling data.

use serde::Deserialize;

use crate::compare::Comparison;
use crate::config::Config;
use crate::report::ProfileRecord;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct LlmClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.profiling_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.ollama_url.clone(),
            model: config.ollama_model.clone(),
        })
    }

    /// POST one prompt and return the generated text. Transport, HTTP-status,
    /// and decode failures come back as an inline error string.
    pub async fn generate(&self, prompt: &str) -> String {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let result = async {
            let response = self
                .client
                .post(&self.url)
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
            let decoded: GenerateResponse = response.json().await?;
            Ok::<String, reqwest::Error>(decoded.response)
        }
        .await;

        match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "LLM analysis failed");
                format!("Error analyzing with LLM: {err}")
            }
        }
    }
}

/// Prompt for single-file optimization suggestions; embeds the file's own
/// source next to the headline metrics.
pub fn optimization_prompt(record: &ProfileRecord, original_code: &str) -> String {
    format!(
        "Analyze this code and provide a concise optimization:\n\n\
         Original Code:\n{original_code}\n\n\
         Profiling Results:\n\
         Time: {:.2}s\n\
         Memory: {:.2}MB\n\n\
         Provide a SHORT response in this exact format:\n\n\
         === Problems ===\n\
         - [List each problem on a new line with hyphen]\n\n\
         === Optimizations ===\n\
         - [List each optimization on a new line with hyphen]\n\n\
         === Optimized Code ===\n\
         [Complete optimized code here]",
        record.execution_time, record.memory_usage.peak
    )
}

/// Prompt comparing two candidate implementations by their stats blobs.
pub fn comparative_prompt(comparison: &Comparison) -> String {
    format!(
        "Compare the following two test implementations and provide insights:\n\n\
         Test File 1: {}\n\
         Profiling Data 1:\n{}\n\n\
         Test File 2: {}\n\
         Profiling Data 2:\n{}\n\n\
         Please provide:\n\
         1. Performance comparison\n\
         2. Key differences in implementation\n\
         3. Recommendations for best approach\n\
         4. Potential hybrid solutions",
        comparison.record_a.test_file,
        comparison.record_a.profile_stats,
        comparison.record_b.test_file,
        comparison.record_b.profile_stats
    )
}

/// Short pattern/best-practice prompt over one record.
pub fn pattern_prompt(record: &ProfileRecord) -> String {
    format!(
        "Analyze the following test code for patterns and best practices:\n\n\
         Test File: {}\n\
         Test Output: {}\n\
         Profiling Data:\n{}\n\n\
         Please identify:\n\
         1. Test patterns used\n\
         2. Potential anti-patterns\n\
         3. Best practice recommendations\n\
         4. Industry standard comparisons",
        record.test_file,
        record.test_output_text(),
        record.profile_stats
    )
}

/// Detailed test-structure prompt; embeds the test source itself.
pub fn structure_prompt(record: &ProfileRecord, test_code: &str) -> String {
    format!(
        "Analyze this test code and provide specific insights:\n\n\
         Test Code:\n{test_code}\n\n\
         Profiling Data:\n{}\n\n\
         Provide a structured analysis in this format:\n\n\
         === Test Structure Analysis ===\n\
         - Test framework used\n\
         - Number of test cases\n\
         - Test case organization\n\
         - Setup/teardown patterns\n\n\
         === Test Quality Indicators ===\n\
         - Test independence\n\
         - Assertion patterns\n\
         - Test coverage\n\
         - Edge case handling\n\n\
         === Performance Patterns ===\n\
         - Time complexity patterns\n\
         - Memory usage patterns\n\
         - Resource management\n\
         - Potential bottlenecks\n\n\
         === Recommendations ===\n\
         - Specific improvements\n\
         - Best practice suggestions\n\
         - Optimization opportunities\n\
         - Test coverage gaps",
        record.profile_stats
    )
}
