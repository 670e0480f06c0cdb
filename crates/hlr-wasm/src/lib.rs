//! WASM bindings for the hidden-line-removal engine.
//!
//! Intended to run inside a web worker: the host posts the mesh buffers
//! and a projection, the binding drives the resumable engine in time
//! slices, reporting progress through a callback between slices, and
//! returns the final line coordinates.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use hlr_engine::{GenerateOptions, HiddenLineTask, TaskStatus};
use hlr_math::Vec3;
use hlr_mesh::{extract_feature_edges, Bvh, TriangleMesh};

/// Initialize the WASM module (sets up panic hook for better error messages).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[WASM] hlr-wasm loaded".into());
}

/// A hidden-line generation request posted from the host.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    /// Flat array of triangle indices. Empty for non-indexed meshes.
    #[serde(default)]
    pub index_buffer: Vec<u32>,
    /// Flat array of vertex positions: [x0, y0, z0, x1, y1, z1, ...].
    pub position_buffer: Vec<f32>,
    /// Projection and engine options.
    pub options: WorkerOptions,
}

/// Options carried by a [`WorkerRequest`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerOptions {
    /// Orthographic projection direction, pointing from the scene toward
    /// the viewer.
    pub projection: [f64; 3],
    /// Engine options; missing fields take their defaults.
    #[serde(flatten)]
    pub generate: GenerateOptions,
}

/// Progress or terminal message sent back to the host.
///
/// The stream is a sequence of progress messages followed by exactly one
/// terminal message, which carries either `result` or `error` and always
/// reports `progress` 1.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    /// Fractional completion in `[0, 1]`.
    pub progress: f32,
    /// Failure description, terminal messages only.
    pub error: Option<String>,
    /// Final line coordinates, `[x, y, z]` per endpoint, two endpoints
    /// per segment, with the projection-axis component zeroed.
    pub result: Option<Vec<f32>>,
}

impl WorkerResponse {
    fn in_progress(progress: f32) -> Self {
        Self {
            progress,
            error: None,
            result: None,
        }
    }

    fn finished(result: Vec<f32>) -> Self {
        Self {
            progress: 1.0,
            error: None,
            result: Some(result),
        }
    }

    fn failed(error: String) -> Self {
        Self {
            progress: 1.0,
            error: Some(error),
            result: None,
        }
    }
}

/// Run hidden-line generation for a posted request.
///
/// `on_progress` (if given) is called with a [`WorkerResponse`] after
/// every time slice; the terminal response is the return value. Input
/// validation failures and cancellation come back as a response with
/// `error` set rather than a thrown exception, so the worker protocol
/// stays a single message shape.
#[wasm_bindgen(js_name = generateHiddenLines)]
pub fn generate_hidden_lines(
    request: JsValue,
    on_progress: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    let request: WorkerRequest = serde_wasm_bindgen::from_value(request)
        .map_err(|e| JsError::new(&format!("Invalid request: {}", e)))?;

    let response = run_request(request, |progress| {
        if let Some(callback) = &on_progress {
            let message = serde_wasm_bindgen::to_value(&WorkerResponse::in_progress(progress))
                .unwrap_or(JsValue::NULL);
            let _ = callback.call1(&JsValue::NULL, &message);
        }
    });

    serde_wasm_bindgen::to_value(&response).map_err(|e| JsError::new(&e.to_string()))
}

/// Drive a request to completion, invoking `report` between time slices.
fn run_request(request: WorkerRequest, mut report: impl FnMut(f32)) -> WorkerResponse {
    let mesh = TriangleMesh::new(request.position_buffer, request.index_buffer);
    let bvh = Bvh::build(&mesh);
    let projection = Vec3::new(
        request.options.projection[0],
        request.options.projection[1],
        request.options.projection[2],
    );
    let options = request.options.generate;

    let edges = extract_feature_edges(&mesh, options.feature_angle_threshold_degrees);
    let mut task = match HiddenLineTask::new(&mesh, &bvh, projection, edges, options.clone()) {
        Ok(task) => task,
        Err(e) => return WorkerResponse::failed(e.to_string()),
    };
    let axis = task.axis();

    loop {
        match task.resume_with(slice_timer(options.time_slice_millis)) {
            Ok(TaskStatus::Done(set)) => {
                return WorkerResponse::finished(set.to_coordinate_buffer(axis, 0.0));
            }
            Ok(TaskStatus::InProgress(progress)) => report(progress),
            Err(e) => return WorkerResponse::failed(e.to_string()),
        }
    }
}

/// Budget predicate for one time slice, on a clock the target actually
/// has: `Date.now()` in wasm (`Instant` traps there), the std monotonic
/// clock elsewhere.
fn slice_timer(budget_millis: u64) -> impl FnMut() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        let deadline = js_sys::Date::now() + budget_millis as f64;
        move || js_sys::Date::now() >= deadline
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let deadline =
            std::time::Instant::now() + std::time::Duration::from_millis(budget_millis);
        move || std::time::Instant::now() >= deadline
    }
}
