#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use design_extract_lib::{
    core::{
        config::Config,
        errors::{AppError, AppResult},
        types::DocumentNode,
    },
    providers::design_api::{DesignApi, RenderOptions},
};
use serde_json::Value;

pub fn text(id: &str, characters: &str, x: f64, y: f64, w: f64, h: f64) -> Value {
    serde_json::json!({
        "id": id,
        "name": characters,
        "type": "TEXT",
        "characters": characters,
        "absoluteBoundingBox": {"x": x, "y": y, "width": w, "height": h},
        "fills": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0, "a": 1}}]
    })
}

pub fn image(id: &str, node_type: &str, x: f64, y: f64, w: f64, h: f64) -> Value {
    serde_json::json!({
        "id": id,
        "name": "artwork",
        "type": node_type,
        "absoluteBoundingBox": {"x": x, "y": y, "width": w, "height": h},
        "fills": [{"type": "IMAGE", "scaleMode": "FILL", "imageRef": format!("ref-{id}")}]
    })
}

pub fn container(id: &str, node_type: &str, children: Vec<Value>) -> Value {
    serde_json::json!({
        "id": id,
        "name": id,
        "type": node_type,
        "children": children
    })
}

pub fn node(value: Value) -> DocumentNode {
    serde_json::from_value(value).expect("fixture should deserialize")
}

/// Page with the anchor label and two goal cards laid out side by side.
pub fn goals_document() -> DocumentNode {
    node(container(
        "0:0",
        "DOCUMENT",
        vec![container(
            "0:1",
            "CANVAS",
            vec![container(
                "1:1",
                "FRAME",
                vec![
                    text("1:2", "Выберите цель", 0.0, -80.0, 300.0, 40.0),
                    container(
                        "2:1",
                        "FRAME",
                        vec![
                            image("2:2", "RECTANGLE", 0.0, 0.0, 200.0, 200.0),
                            text("2:3", "Квартира", 0.0, 210.0, 200.0, 20.0),
                        ],
                    ),
                    container(
                        "3:1",
                        "FRAME",
                        vec![
                            image("3:2", "RECTANGLE", 1000.0, 0.0, 200.0, 200.0),
                            text("3:3", "Первый взнос", 1000.0, 210.0, 200.0, 20.0),
                        ],
                    ),
                ],
            )],
        )],
    ))
}

pub fn test_config(output_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut values: HashMap<String, String> = HashMap::new();
    values.insert("DESIGN_API_TOKEN".to_string(), "secret-token".to_string());
    values.insert("DESIGN_FILE_KEY".to_string(), "FILEKEY".to_string());
    values.insert(
        "DESIGN_OUTPUT_DIR".to_string(),
        output_dir.to_string_lossy().to_string(),
    );
    for (key, value) in overrides {
        values.insert((*key).to_string(), (*value).to_string());
    }
    Config::from_lookup(|key| values.get(key).cloned()).expect("test config should load")
}

/// In-memory stand-in for the design API.
#[derive(Default)]
pub struct FakeDesignApi {
    pub document: Option<DocumentNode>,
    pub document_error: Option<fn() -> AppError>,
    pub document_delay: Option<Duration>,
    pub urls: HashMap<String, Option<String>>,
    pub failing_urls: HashSet<String>,
    pub url_requests: Mutex<Vec<Vec<String>>>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeDesignApi {
    pub fn with_document(document: DocumentNode) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    pub fn url(mut self, node_id: &str, url: Option<&str>) -> Self {
        self.urls
            .insert(node_id.to_string(), url.map(ToString::to_string));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn url_requests(&self) -> Vec<Vec<String>> {
        self.url_requests.lock().expect("lock").clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DesignApi for FakeDesignApi {
    async fn fetch_document(&self, file_key: &str) -> AppResult<DocumentNode> {
        if let Some(delay) = self.document_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(make_error) = self.document_error {
            return Err(make_error());
        }
        self.document
            .clone()
            .ok_or_else(|| AppError::NotFound(format!("file {file_key}")))
    }

    async fn fetch_image_urls(
        &self,
        _file_key: &str,
        node_ids: &[String],
        _options: RenderOptions,
    ) -> AppResult<HashMap<String, Option<String>>> {
        self.url_requests
            .lock()
            .expect("lock")
            .push(node_ids.to_vec());
        Ok(node_ids
            .iter()
            .filter_map(|id| self.urls.get(id).map(|url| (id.clone(), url.clone())))
            .collect())
    }

    async fn download_image(&self, url: &str, dest: &Path) -> AppResult<u64> {
        self.downloads.lock().expect("lock").push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(AppError::Transient(format!("connection reset fetching {url}")));
        }
        let body = format!("png bytes from {url}");
        tokio::fs::write(dest, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }
}
