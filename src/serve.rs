//! HTTP server for interactive mode
//!
//! `verilens serve` → starts server, opens browser, lets you drop a detector
//! result JSON on the page and see the verdict and heatmaps.
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `GET /` | | embedded UI |
//! | `POST /api/assess` | result JSON | verdict + figures as JSON |
//! | `POST /api/render?layer=..&size=..&preserve_aspect=..` | result JSON | `image/png` |

use crate::decision::Assessment;
use crate::render::{CanvasPolicy, Layer, Renderer, DEFAULT_CANVAS_SIZE, MAX_CANVAS_SIZE};
use crate::report::png;
use crate::result::DetectionResult;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl ToString) -> Self {
        Self { ok: false, data: None, error: Some(error.to_string()) }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct RenderParams {
    #[serde(default = "default_layer")]
    pub layer: Layer,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub preserve_aspect: bool,
}

fn default_layer() -> Layer { Layer::Prediction }
fn default_size() -> usize { DEFAULT_CANVAS_SIZE }

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            layer: default_layer(),
            size: default_size(),
            preserve_aspect: false,
        }
    }
}

impl RenderParams {
    pub fn renderer(&self) -> Renderer {
        let policy = if self.preserve_aspect {
            CanvasPolicy::AspectFit { max: self.size }
        } else {
            CanvasPolicy::Fixed { size: self.size }
        };
        Renderer::new().with_policy(policy)
    }
}

/// Start server, open browser, serve UI
pub fn start(port: u16) -> io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32mVerilens\x1b[0m");
    eprintln!("   {}\n", url);

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn header(name: &str, value: &str) -> io::Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("bad header {}", name)))
}

fn respond_json<T: Serialize>(request: Request, status: u16, body: &T) -> io::Result<()> {
    let json = serde_json::to_string(body)?;
    let response = Response::from_string(json)
        .with_status_code(status)
        .with_header(header("Content-Type", "application/json")?);
    request.respond(response)
}

fn handle_request(mut request: Request) -> io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();
    debug!("{} {}", method, url);

    match (&method, path) {
        // Serve embedded UI
        (&Method::Get, "/") => {
            let response = Response::from_string(UI_HTML).with_header(header("Content-Type", "text/html")?);
            request.respond(response)
        }

        // API: verdict for a posted result
        (&Method::Post, "/api/assess") => match read_result(&mut request) {
            Ok(result) => {
                let assessment = Assessment::from_result(&result);
                info!(
                    "assess {}: {}",
                    result.filename.as_deref().unwrap_or("<unnamed>"),
                    assessment.verdict
                );
                respond_json(request, 200, &ApiResponse::success(assessment))
            }
            Err(e) => respond_json(request, 400, &ApiResponse::<()>::failure(e)),
        },

        // API: one layer as PNG
        (&Method::Post, "/api/render") => {
            let params = match parse_render_params(&url) {
                Ok(p) => p,
                Err(e) => return respond_json(request, 400, &ApiResponse::<()>::failure(e)),
            };
            let result = match read_result(&mut request) {
                Ok(r) => r,
                Err(e) => return respond_json(request, 400, &ApiResponse::<()>::failure(e)),
            };

            match params.renderer().render_layer(&result, params.layer) {
                Ok(Some(buffer)) => {
                    let png = png::encode(&buffer)?;
                    let response = Response::from_data(png).with_header(header("Content-Type", "image/png")?);
                    request.respond(response)
                }
                Ok(None) => {
                    let msg = format!("result has no data for the {} layer", params.layer);
                    respond_json(request, 404, &ApiResponse::<()>::failure(msg))
                }
                Err(e) => respond_json(request, 400, &ApiResponse::<()>::failure(e)),
            }
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn read_result(request: &mut Request) -> Result<DetectionResult, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| e.to_string())?;
    DetectionResult::from_json_str(&body).map_err(|e| e.to_string())
}

/// Query-string params; absent keys take their defaults, malformed or
/// out-of-range values are an error
pub fn parse_render_params(url: &str) -> Result<RenderParams, String> {
    let params = match url.split_once('?') {
        Some((_, query)) if !query.is_empty() => serde_urlencoded::from_str::<RenderParams>(query)
            .map_err(|e| format!("invalid query: {}", e))?,
        _ => RenderParams::default(),
    };

    if params.size == 0 || params.size > MAX_CANVAS_SIZE {
        return Err(format!(
            "size must be between 1 and {}, got {}",
            MAX_CANVAS_SIZE, params.size
        ));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PARAM PARSING TESTS
    // ==========================================================================

    #[test]
    fn test_params_default_without_query() {
        assert_eq!(parse_render_params("/api/render"), Ok(RenderParams::default()));
        assert_eq!(parse_render_params("/api/render?"), Ok(RenderParams::default()));
    }

    #[test]
    fn test_params_from_query() {
        let params = parse_render_params("/api/render?layer=overlay&size=120&preserve_aspect=true").unwrap();
        assert_eq!(params.layer, Layer::Overlay);
        assert_eq!(params.size, 120);
        assert!(params.preserve_aspect);
        assert_eq!(params.renderer().policy, CanvasPolicy::AspectFit { max: 120 });
    }

    #[test]
    fn test_params_partial_query_keeps_defaults() {
        let params = parse_render_params("/api/render?layer=noiseprint").unwrap();
        assert_eq!(params.layer, Layer::Noiseprint);
        assert_eq!(params.size, 300);
        assert_eq!(params.renderer().policy, CanvasPolicy::Fixed { size: 300 });
    }

    #[test]
    fn test_params_malformed_value_is_an_error() {
        assert!(parse_render_params("/api/render?layer=overlay&size=abc").is_err());
        assert!(parse_render_params("/api/render?layer=histogram").is_err());
        assert!(parse_render_params("/api/render?preserve_aspect=maybe").is_err());
    }

    #[test]
    fn test_params_size_bounds() {
        assert!(parse_render_params("/api/render?size=0").is_err());
        assert!(parse_render_params("/api/render?size=8589934592").is_err());
        assert!(parse_render_params(&format!("/api/render?size={}", MAX_CANVAS_SIZE + 1)).is_err());
        assert_eq!(
            parse_render_params(&format!("/api/render?size={}", MAX_CANVAS_SIZE)).map(|p| p.size),
            Ok(MAX_CANVAS_SIZE)
        );
    }

    #[test]
    fn test_api_response_shape() {
        let json = serde_json::to_string(&ApiResponse::<()>::failure("nope")).unwrap();
        assert_eq!(json, r#"{"ok":false,"data":null,"error":"nope"}"#);
    }
}
