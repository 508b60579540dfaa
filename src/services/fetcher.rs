// src/services/fetcher.rs

//! Page fetching.
//!
//! A [`PageFetcher`] owns whatever session is needed to render timeline pages.
//! The pipeline acquires one per run and calls [`PageFetcher::close`] exactly
//! once when the run ends.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{FetcherConfig, QuestionId};
use crate::utils::http;

/// Source of rendered timeline documents.
#[async_trait]
pub trait PageFetcher: Send {
    /// Fetch the rendered timeline page of a question.
    ///
    /// Timeouts and navigation failures are reported as
    /// [`AppError::Fetch`]; any other error ends the run.
    async fn fetch(&mut self, question_id: QuestionId) -> Result<String>;

    /// Release the underlying session.
    async fn close(&mut self) -> Result<()>;
}

/// Fetches server-rendered timeline pages over plain HTTP.
pub struct HttpFetcher {
    config: FetcherConfig,
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: http::create_page_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, question_id: QuestionId) -> Result<String> {
        let url = self.config.timeline_url(question_id)?;
        http::fetch_text(&self.client, url.as_str())
            .await
            .map_err(|e| AppError::fetch(question_id, e))
    }

    async fn close(&mut self) -> Result<()> {
        log::debug!("HTTP fetcher closed");
        Ok(())
    }
}

/// Build the fetcher selected by the configuration.
///
/// A WebDriver session is opened when `webdriver_url` is set, plain HTTP is
/// used otherwise.
pub async fn connect(config: &FetcherConfig) -> Result<Box<dyn PageFetcher>> {
    match &config.webdriver_url {
        Some(endpoint) => {
            let fetcher = super::WebDriverFetcher::connect(endpoint, config).await?;
            Ok(Box::new(fetcher))
        }
        None => {
            if headless_ignored(config) {
                log::warn!("headless = false has no effect without a WebDriver endpoint");
            }
            log::info!("Fetching timelines over HTTP from {}", config.base_url);
            Ok(Box::new(HttpFetcher::new(config)?))
        }
    }
}

/// Whether a non-headless browser was asked for while fetching over HTTP.
fn headless_ignored(config: &FetcherConfig) -> bool {
    config.webdriver_url.is_none() && !config.headless
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    async fn fetch(&mut self, question_id: QuestionId) -> Result<String> {
        (**self).fetch(question_id).await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}
