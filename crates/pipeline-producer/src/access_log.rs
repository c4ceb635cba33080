// Archivo: access_log.rs
// Propósito: productor de logs de acceso. Atiende un conjunto fijo de rutas
// HTTP y, por cada petición atendida con éxito, envía una entrada de log al
// delivery stream como un registro JSON terminado en salto de línea.
//
// Las rutas desconocidas responden 404 y no generan entrada. Un fallo del
// delivery stream se registra en el log y nunca altera la respuesta HTTP.
use chrono::SecondsFormat;
use log::{error, info};
use pipeline::config::{env_lookup, first_var, require_var};
use pipeline::{Clock, DeliveryStream};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const SERVICE_NAME: &str = "Lambda ALB Example";
pub const SERVICE_VERSION: &str = "1.0.0";

/// Configuración del productor de logs de acceso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogConfig {
  pub stream_name: String,
  pub environment: String,
  pub region: Option<String>,
}

impl AccessLogConfig {
  pub fn from_env() -> pipeline::Result<Self> {
    Self::from_lookup(env_lookup())
  }

  pub fn from_lookup<F>(lookup: F) -> pipeline::Result<Self>
    where F: Fn(&str) -> Option<String>
  {
    Ok(Self { stream_name: require_var(&lookup, &["FIREHOSE_STREAM_NAME", "DELIVERY_STREAM_NAME"])?,
              environment: first_var(&lookup, &["ENVIRONMENT"]).unwrap_or_else(|| "dev".to_string()),
              region: first_var(&lookup, &["AWS_REGION"]) })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub source_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
  pub request_id: Option<String>,
  pub identity: Option<Identity>,
}

/// Petición HTTP tal como la entrega el balanceador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
  pub path: Option<String>,
  pub http_method: Option<String>,
  #[serde(default)]
  pub headers: HashMap<String, String>,
  pub query_string_parameters: Option<HashMap<String, String>>,
  pub body: Option<String>,
  pub request_context: Option<RequestContext>,
}

impl HttpRequest {
  pub fn get(path: &str) -> Self {
    Self { path: Some(path.to_string()),
           http_method: Some("GET".to_string()),
           ..Self::default() }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.insert(name.to_string(), value.to_string());
    self
  }

  pub fn path(&self) -> &str {
    non_empty(self.path.as_deref()).unwrap_or("/")
  }

  pub fn method(&self) -> &str {
    non_empty(self.http_method.as_deref()).unwrap_or("GET")
  }

  /// Header sin distinguir mayúsculas; un valor vacío cuenta como ausente.
  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| non_empty(Some(v.as_str())))
  }

  pub fn source_ip(&self) -> &str {
    self.header("x-forwarded-for")
        .or_else(|| self.header("x-real-ip"))
        .or_else(|| {
          let ctx = self.request_context.as_ref()?;
          non_empty(ctx.identity.as_ref()?.source_ip.as_deref())
        })
        .unwrap_or("unknown")
  }

  pub fn request_id(&self) -> &str {
    self.request_context
        .as_ref()
        .and_then(|ctx| non_empty(ctx.request_id.as_deref()))
        .or_else(|| self.header("x-amzn-trace-id"))
        .unwrap_or("unknown")
  }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
  v.filter(|s| !s.is_empty())
}

/// Respuesta HTTP devuelta al balanceador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
  pub status_code: u16,
  pub headers: BTreeMap<String, String>,
  pub body: String,
}

impl HttpResponse {
  pub fn body_json(&self) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_str(&self.body)
  }
}

/// Entrada de log que se envía al delivery stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
  pub timestamp: String,
  pub request_id: String,
  pub method: String,
  pub path: String,
  pub user_agent: String,
  pub source_ip: String,
  pub headers: HashMap<String, String>,
  pub query_string: HashMap<String, String>,
  pub body: Option<String>,
  pub waf_action: String,
  pub response_code: u16,
}

/// Rutas conocidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Health,
  Hello,
  Info,
  Root,
  NotFound,
}

impl Route {
  pub fn from_path(path: &str) -> Self {
    match path {
      "/health" => Route::Health,
      "/api/hello" => Route::Hello,
      "/api/info" => Route::Info,
      "/" => Route::Root,
      _ => Route::NotFound,
    }
  }
}

pub struct AccessLogHandler {
  stream: Arc<dyn DeliveryStream>,
  clock: Arc<dyn Clock>,
  config: AccessLogConfig,
}

impl AccessLogHandler {
  pub fn new(stream: Arc<dyn DeliveryStream>, clock: Arc<dyn Clock>, config: AccessLogConfig) -> Self {
    Self { stream, clock, config }
  }

  pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
    let path = request.path();
    let method = request.method();
    let route = Route::from_path(path);
    info!("AccessLog: {} {} -> {:?}", method, path, route);

    let response = self.respond(route, request);
    if route != Route::NotFound {
      let entry = self.log_entry(request, response.status_code);
      self.ship(&entry).await;
    }
    response
  }

  fn now_iso(&self) -> String {
    self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)
  }

  fn respond(&self, route: Route, request: &HttpRequest) -> HttpResponse {
    let timestamp = self.now_iso();
    let (status_code, body) = match route {
      Route::Health => (200,
                        json!({
                          "status": "healthy",
                          "timestamp": timestamp,
                          "environment": self.config.environment,
                        })),
      Route::Hello => (200,
                       json!({
                         "message": "Hello from Lambda!",
                         "timestamp": timestamp,
                         "method": request.method(),
                         "path": request.path(),
                       })),
      Route::Info => (200,
                      json!({
                        "service": SERVICE_NAME,
                        "version": SERVICE_VERSION,
                        "environment": self.config.environment,
                        "region": self.config.region,
                        "timestamp": timestamp,
                      })),
      Route::Root => (200,
                      json!({
                        "message": "Welcome to Lambda ALB Example",
                        "endpoints": [
                          "/health - Health check endpoint",
                          "/api/hello - Hello endpoint",
                          "/api/info - Service information"
                        ],
                        "timestamp": timestamp,
                      })),
      Route::NotFound => (404,
                          json!({
                            "error": "Not Found",
                            "message": format!("Path {} not found", request.path()),
                            "timestamp": timestamp,
                          })),
    };
    HttpResponse { status_code,
                   headers: response_headers(),
                   body: body.to_string() }
  }

  fn log_entry(&self, request: &HttpRequest, response_code: u16) -> AccessLogEntry {
    AccessLogEntry { timestamp: self.now_iso(),
                     request_id: request.request_id().to_string(),
                     method: request.method().to_string(),
                     path: request.path().to_string(),
                     user_agent: request.header("user-agent").unwrap_or("unknown").to_string(),
                     source_ip: request.source_ip().to_string(),
                     headers: request.headers.clone(),
                     query_string: request.query_string_parameters.clone().unwrap_or_default(),
                     body: request.body.clone(),
                     waf_action: "ALLOW".to_string(),
                     response_code }
  }

  async fn ship(&self, entry: &AccessLogEntry) {
    let mut payload = match serde_json::to_vec(entry) {
      Ok(p) => p,
      Err(e) => {
        error!("AccessLog: no se pudo serializar la entrada: {}", e);
        return;
      }
    };
    payload.push(b'\n');
    match self.stream.put_record(&self.config.stream_name, payload).await {
      Ok(()) => info!("AccessLog: entrada enviada a {}", self.config.stream_name),
      Err(e) => error!("AccessLog: error enviando la entrada: {}", e),
    }
  }
}

fn response_headers() -> BTreeMap<String, String> {
  [("Content-Type", "application/json"),
   ("Access-Control-Allow-Origin", "*"),
   ("Access-Control-Allow-Headers", "Content-Type"),
   ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")].into_iter()
                                                                     .map(|(k, v)| (k.to_string(), v.to_string()))
                                                                     .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn source_ip_and_request_id_fallbacks() {
    let req = HttpRequest::get("/").with_header("X-Real-IP", "10.0.0.2").with_header("x-forwarded-for", "");
    assert_eq!(req.source_ip(), "10.0.0.2");
    assert_eq!(req.request_id(), "unknown");

    let mut req = HttpRequest::get("/").with_header("x-amzn-trace-id", "Root=1-abc");
    assert_eq!(req.request_id(), "Root=1-abc");
    assert_eq!(req.source_ip(), "unknown");
    req.request_context = Some(RequestContext { request_id: Some("ctx-1".into()),
                                                identity: Some(Identity { source_ip: Some("1.2.3.4".into()) }) });
    assert_eq!(req.request_id(), "ctx-1");
    assert_eq!(req.source_ip(), "1.2.3.4");
  }

  #[test]
  fn defaults_for_missing_path_and_method() {
    let req = HttpRequest::default();
    assert_eq!(req.path(), "/");
    assert_eq!(req.method(), "GET");
    assert_eq!(Route::from_path("/api/info/"), Route::NotFound);
  }

  #[test]
  fn config_falls_back_to_delivery_stream_name() {
    let cfg = AccessLogConfig::from_lookup(|k: &str| match k {
                                              "DELIVERY_STREAM_NAME" => Some("logs".to_string()),
                                              _ => None,
                                            }).unwrap();
    assert_eq!(cfg.stream_name, "logs");
    assert_eq!(cfg.environment, "dev");
    assert_eq!(cfg.region, None);
  }
}
