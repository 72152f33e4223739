//! Cross-module tests for the document QA pipeline.

mod ranking;
mod support;
