//! The pull pipeline: resolve filters, fetch, transform, and write every output
//! of a project configuration.
//!
//! Outputs are processed concurrently and independently. A failure in one output
//! never prevents the others from being written, and an output's files are only
//! written once all of them have been generated. Variables are fetched once per
//! pass and shared by every output that needs them.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::join_all;
use tracing::{Instrument, info, info_span, warn};

use crate::{
    client::{ContentApi, RequestContext, TokenSource},
    config::{Output, ProjectConfig},
    driver,
    error::Error,
    fetch::{self, VariableIndex},
    filter,
    formats::{self, OutputFormat, export, json, swift},
    types::OutputFile,
    writer::FileWriter,
};

/// Outcome of one output.
#[derive(Debug)]
pub struct OutputReport {
    /// Position of the output in the configuration.
    pub index: usize,
    pub format: OutputFormat,
    pub out_dir: PathBuf,
    /// Paths written, or the error that stopped the output before anything was written.
    pub result: Result<Vec<PathBuf>, Error>,
    /// Files that could not be written; they are not retried.
    pub write_failures: Vec<Error>,
}

impl OutputReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok() && self.write_failures.is_empty()
    }

    fn needs_reauthentication(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_auth())
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outputs: Vec<OutputReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outputs.iter().all(OutputReport::is_success)
    }

    /// Every path written during the run.
    pub fn written(&self) -> Vec<&Path> {
        self.outputs
            .iter()
            .filter_map(|report| report.result.as_ref().ok())
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Runs outputs against a content API and a file writer.
#[derive(Clone)]
pub struct Pipeline {
    api: Arc<dyn ContentApi>,
    writer: Arc<dyn FileWriter>,
    token_source: Option<Arc<dyn TokenSource>>,
}

impl Pipeline {
    pub fn new(api: Arc<dyn ContentApi>, writer: Arc<dyn FileWriter>) -> Self {
        Pipeline {
            api,
            writer,
            token_source: None,
        }
    }

    /// Collect a new token from `source` when the API rejects the current one.
    pub fn with_token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    /// Processes every output of `config`.
    ///
    /// Returns an error only for an invalid configuration; per-output failures are
    /// reported in the [`RunReport`].
    pub async fn run(&self, ctx: &RequestContext, config: &ProjectConfig) -> Result<RunReport, Error> {
        config.validate()?;

        let mut reports = self.run_outputs(ctx, config, 0..config.outputs.len()).await;

        let rejected: Vec<usize> = reports
            .iter()
            .filter(|r| r.needs_reauthentication())
            .map(|r| r.index)
            .collect();
        if !rejected.is_empty() {
            if let Some(source) = &self.token_source {
                warn!(outputs = rejected.len(), "token rejected, collecting a new one");
                match self.renew_token(source.as_ref(), ctx).await {
                    Ok(renewed) => {
                        for retried in self.run_outputs(&renewed, config, rejected).await {
                            let index = retried.index;
                            reports[index] = retried;
                        }
                    }
                    Err(error) => warn!(%error, "could not collect a new token"),
                }
            }
        }

        info!(
            outputs = reports.len(),
            failed = reports.iter().filter(|r| !r.is_success()).count(),
            "pull finished"
        );
        Ok(RunReport { outputs: reports })
    }

    async fn renew_token(
        &self,
        source: &dyn TokenSource,
        ctx: &RequestContext,
    ) -> Result<RequestContext, Error> {
        let renewed = ctx.with_token(source.collect_token().await?);
        self.api.check_token(&renewed).await?;
        Ok(renewed)
    }

    async fn run_outputs(
        &self,
        ctx: &RequestContext,
        config: &ProjectConfig,
        indices: impl IntoIterator<Item = usize>,
    ) -> Vec<OutputReport> {
        let indices: Vec<usize> = indices.into_iter().collect();
        let needs_variables = indices
            .iter()
            .any(|&index| config.outputs[index].format != OutputFormat::Swift);
        let variables = if needs_variables {
            fetch::fetch_variables(self.api.as_ref(), ctx).await
        } else {
            Ok(VariableIndex::new())
        };

        let runs = indices.into_iter().map(|index| {
            let output = &config.outputs[index];
            let span = info_span!("output", index, format = %output.format);
            self.run_output(ctx, config, index, output, &variables)
                .instrument(span)
        });
        join_all(runs).await
    }

    async fn run_output(
        &self,
        ctx: &RequestContext,
        config: &ProjectConfig,
        index: usize,
        output: &Output,
        variables: &Result<VariableIndex, Error>,
    ) -> OutputReport {
        let mut report = OutputReport {
            index,
            format: output.format,
            out_dir: output.out_dir(),
            result: Ok(Vec::new()),
            write_failures: Vec::new(),
        };

        let files = match self.generate_files(ctx, config, output, variables).await {
            Ok(files) => files,
            Err(error) => {
                warn!(%error, "output failed, nothing written");
                report.result = Err(error);
                return report;
            }
        };

        let mut written = Vec::with_capacity(files.len());
        for file in &files {
            match self.writer.write_output(file) {
                Ok(()) => written.push(file.path()),
                Err(error) => {
                    warn!(%error, path = %file.path().display(), "failed to write file");
                    report.write_failures.push(error);
                }
            }
        }
        info!(files = written.len(), "output written");
        report.result = Ok(written);
        report
    }

    /// Fetches and transforms one output without writing anything.
    ///
    /// `variables` is the run's shared variable fetch; Swift outputs ignore it.
    pub async fn generate_files(
        &self,
        ctx: &RequestContext,
        config: &ProjectConfig,
        output: &Output,
        variables: &Result<VariableIndex, Error>,
    ) -> Result<Vec<OutputFile>, Error> {
        let api = self.api.as_ref();
        let filters = filter::resolve(config, output);
        let out_dir = output.out_dir();

        if output.format == OutputFormat::Swift {
            return swift::generate(api, ctx, &filters, &out_dir).await;
        }

        let strategy = formats::strategy_for(config, output)?;
        let variables = variables.as_ref().map_err(Error::clone)?;
        let mut files = match strategy.export_format_id() {
            Some(format_id) => {
                let content = fetch::fetch_exports(api, ctx, &filters, format_id, variables).await?;
                export::transform(content, strategy.as_ref())?
            }
            None => {
                let content = fetch::fetch_structured(api, ctx, &filters, variables).await?;
                json::transform(&content, strategy.as_ref(), filters.rich_text_enabled())?
            }
        };

        if let Some(framework) = &output.framework {
            driver::apply_framework(&mut files, framework, &out_dir);
        }

        Ok(files)
    }
}
