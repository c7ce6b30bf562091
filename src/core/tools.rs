//! The tool table: six named operations over the capability providers
//!
//! Names double as REST paths and MCP tool names.

use crate::core::config::Config;
use crate::core::dispatch::{Gateway, ToolDescriptor, ToolInvoker};
use crate::core::error::{GatewayError, Result};
use crate::core::providers::{Calculator, PageExtractor, WebSearch};
use crate::core::schema::{ParamSpec, RequestSchema, ToolArgs};
use crate::core::types::ToolOutput;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const CALC_HELP: &str = "calc-help";
pub const CALC_LIST_ALLOWED_FNS: &str = "calc-list_allowed_fns";
pub const CALC_EVALUATE: &str = "calc-evaluate";
pub const WEB_SEARCH_GOOGLE: &str = "web-search_google";
pub const WEB_SEARCH_SEARXNG: &str = "web-search_searxng";
pub const WEB_FETCH_WEBPAGE: &str = "web-fetch_webpage";

/// Every tool name in registration order
pub const TOOL_NAMES: [&str; 6] = [
    CALC_HELP,
    CALC_LIST_ALLOWED_FNS,
    CALC_EVALUATE,
    WEB_SEARCH_GOOGLE,
    WEB_SEARCH_SEARXNG,
    WEB_FETCH_WEBPAGE,
];

pub const SEARXNG_NOT_CONFIGURED: &str =
    "SearXNG search feature is not configured. Please set the SEARXNG_BASE_URL environment variable.";

/// Provider set the tools run against
#[derive(Clone)]
pub struct Providers {
    pub google: Arc<dyn WebSearch>,
    pub searxng: Arc<dyn WebSearch>,
    pub webpage: Arc<dyn PageExtractor>,
    pub calculator: Arc<dyn Calculator>,
}

/// Build a gateway with all six tools registered
pub fn build_gateway(config: Arc<Config>, providers: Providers) -> Result<Gateway> {
    let mut gateway = Gateway::new(Arc::clone(&config));
    for descriptor in descriptors(&config, providers) {
        gateway.register(descriptor)?;
    }
    Ok(gateway)
}

fn descriptors(config: &Config, providers: Providers) -> Vec<ToolDescriptor> {
    let Providers {
        google,
        searxng,
        webpage,
        calculator,
    } = providers;

    vec![
        ToolDescriptor::new(
            CALC_HELP,
            "Show help text for one of the calculator's allowed functions.",
            RequestSchema::new(vec![ParamSpec::string(
                "fn_name",
                "Name of the function to describe",
            )
            .required()
            .trimmed()
            .non_empty()]),
            Arc::new(CalcHelp(Arc::clone(&calculator))),
        ),
        ToolDescriptor::new(
            CALC_LIST_ALLOWED_FNS,
            "List the functions the calculator accepts, optionally with help text.",
            RequestSchema::new(vec![ParamSpec::boolean(
                "with_help",
                "Include a one-line description of each function",
            )
            .default_value(json!(false))]),
            Arc::new(CalcListAllowedFns(Arc::clone(&calculator))),
        ),
        ToolDescriptor::new(
            CALC_EVALUATE,
            "Evaluate an arithmetic expression. Supports + - * / // % **, comparisons, \
             and/or/not, the constants pi, e, tau, and the functions listed by \
             calc-list_allowed_fns.",
            RequestSchema::new(vec![ParamSpec::string(
                "expression",
                "Expression to evaluate, e.g. 26 * 9 / 5 + 32",
            )
            .required()
            .trimmed()
            .non_empty()]),
            Arc::new(CalcEvaluate(calculator)),
        ),
        ToolDescriptor::new(
            WEB_SEARCH_GOOGLE,
            "Search the web with Google and return titles, URLs and snippets.",
            search_schema(config),
            Arc::new(Search(google)),
        ),
        ToolDescriptor::new(
            WEB_SEARCH_SEARXNG,
            "Search the web with the configured SearXNG instance and return titles, \
             URLs and snippets.",
            search_schema(config),
            Arc::new(Search(searxng)),
        )
        .with_availability(searxng_available),
        ToolDescriptor::new(
            WEB_FETCH_WEBPAGE,
            "Fetch a webpage and return its main text content.",
            RequestSchema::new(vec![
                ParamSpec::string("url", "Absolute http(s) URL of the page")
                    .required()
                    .trimmed()
                    .non_empty(),
                timeout_param(),
            ]),
            Arc::new(FetchWebpage(webpage)),
        ),
    ]
}

fn search_schema(config: &Config) -> RequestSchema {
    RequestSchema::new(vec![
        ParamSpec::string("query", "Search query")
            .required()
            .trimmed()
            .non_empty(),
        ParamSpec::integer("number_results", "Number of results to return")
            .default_value(json!(config.search.default_results))
            .range(1.0, f64::from(config.search.max_results)),
        timeout_param(),
    ])
}

fn timeout_param() -> ParamSpec {
    ParamSpec::number("timeout", "Request timeout in seconds").greater_than(0.0)
}

fn searxng_available(config: &Config) -> std::result::Result<(), String> {
    match config.search.searxng_base_url {
        Some(_) => Ok(()),
        None => Err(SEARXNG_NOT_CONFIGURED.to_string()),
    }
}

fn timeout_arg(args: &ToolArgs) -> std::result::Result<Option<Duration>, GatewayError> {
    args.opt_f64("timeout")
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|_| GatewayError::invalid_field("timeout", "out of range"))
        })
        .transpose()
}

struct CalcHelp(Arc<dyn Calculator>);

#[async_trait]
impl ToolInvoker for CalcHelp {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError> {
        Ok(ToolOutput::Text(self.0.help(args.str("fn_name")?)?))
    }
}

struct CalcListAllowedFns(Arc<dyn Calculator>);

#[async_trait]
impl ToolInvoker for CalcListAllowedFns {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError> {
        let with_help = args.bool("with_help").unwrap_or(false);
        Ok(ToolOutput::Text(self.0.list_allowed_fns(with_help)))
    }
}

struct CalcEvaluate(Arc<dyn Calculator>);

#[async_trait]
impl ToolInvoker for CalcEvaluate {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError> {
        Ok(ToolOutput::Value(self.0.evaluate(args.str("expression")?)?))
    }
}

struct Search(Arc<dyn WebSearch>);

#[async_trait]
impl ToolInvoker for Search {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError> {
        let query = args.str("query")?;
        let number_results = usize::try_from(args.i64("number_results")?)
            .map_err(|_| GatewayError::invalid_field("number_results", "out of range"))?;
        let timeout = timeout_arg(&args)?;

        let records = self.0.search(query, number_results, timeout).await?;
        Ok(ToolOutput::Results(
            records.into_iter().take(number_results).collect(),
        ))
    }
}

struct FetchWebpage(Arc<dyn PageExtractor>);

#[async_trait]
impl ToolInvoker for FetchWebpage {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError> {
        let timeout = timeout_arg(&args)?;
        Ok(ToolOutput::Text(self.0.extract(args.str("url")?, timeout).await?))
    }
}
