//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap};
use axum::Router;
use chrono::{DateTime, NaiveDateTime, Utc};

use beacon_collector::config::CollectorConfig;
use beacon_collector::dispatch::{EnqueueError, Event, ProcessingPool};
use beacon_collector::http::{HttpServer, Pixel};

pub const PARTY_TIMEOUT_SECS: u64 = 730 * 24 * 60 * 60;
pub const SESSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Pool that records every enqueue call in order.
#[derive(Default)]
pub struct RecordingPool {
    calls: Mutex<Vec<(String, Event)>>,
}

impl RecordingPool {
    pub fn calls(&self) -> Vec<(String, Event)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|(key, _)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessingPool for RecordingPool {
    fn enqueue(&self, partition_key: &str, event: Event) -> Result<(), EnqueueError> {
        self.calls
            .lock()
            .unwrap()
            .push((partition_key.to_string(), event));
        Ok(())
    }
}

/// Pool that rejects everything.
pub struct FailingPool;

impl ProcessingPool for FailingPool {
    fn enqueue(&self, _partition_key: &str, _event: Event) -> Result<(), EnqueueError> {
        Err(EnqueueError::Unavailable("downstream offline".to_string()))
    }
}

/// Config with short cookie names and no metrics exporter.
pub fn test_config() -> CollectorConfig {
    let mut config = CollectorConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.tracking.party_cookie = "party".to_string();
    config.tracking.party_timeout_secs = PARTY_TIMEOUT_SECS;
    config.tracking.session_cookie = "session".to_string();
    config.tracking.session_timeout_secs = SESSION_TIMEOUT_SECS;
    config.observability.metrics_enabled = false;
    config
}

pub fn router_with(config: CollectorConfig, pool: Arc<dyn ProcessingPool>) -> Router {
    HttpServer::new(config, Pixel::transparent(), pool).router()
}

pub fn router(pool: Arc<dyn ProcessingPool>) -> Router {
    router_with(test_config(), pool)
}

/// One parsed `Set-Cookie` header.
#[derive(Debug, Clone)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub attributes: HashMap<String, String>,
}

impl SetCookie {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split("; ");
        let (name, value) = parts
            .next()
            .and_then(|pair| pair.split_once('='))
            .expect("cookie pair");
        let attributes = parts
            .map(|attr| match attr.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (attr.to_string(), String::new()),
            })
            .collect();
        Self {
            name: name.to_string(),
            value: value.to_string(),
            attributes,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn expires(&self) -> DateTime<Utc> {
        let raw = self.attr("Expires").expect("Expires attribute");
        NaiveDateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S GMT")
            .expect("IMF-fixdate")
            .and_utc()
    }
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<SetCookie> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| SetCookie::parse(v.to_str().unwrap()))
        .collect()
}

pub fn find_cookie<'a>(cookies: &'a [SetCookie], name: &str) -> &'a SetCookie {
    cookies
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no Set-Cookie for {}", name))
}
