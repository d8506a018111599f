use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, put, web};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use rs_desc_core::pipeline;
use rs_desc_core::resources::Resources;
use rs_desc_core::{ComposerConfig, DescriptionComposer, DirectoryStore, ModelStore};

/// Server configuration, from flags or environment variables.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fictional game store page generation server", long_about = None)]
struct ServerConfig {
	/// Address to bind
	#[arg(long, env = "RS_DESC_BIND", default_value = "127.0.0.1")]
	bind: String,

	/// Port to listen on
	#[arg(long, env = "RS_DESC_PORT", default_value_t = 5000)]
	port: u16,

	/// Folder of trained models
	#[arg(long, env = "RS_DESC_MODELS", value_name = "DIR", default_value = "./models")]
	models_dir: PathBuf,

	/// Folder of training corpora and composer resources
	#[arg(long, env = "RS_DESC_DATA", value_name = "DIR", default_value = "./data")]
	data_dir: PathBuf,

	/// Bias description words toward the genre and section headers
	#[arg(long, env = "RS_DESC_SEMANTIC_CONTEXT")]
	semantic_context: bool,

	/// Accept requests from any origin
	#[arg(long, env = "RS_DESC_PERMISSIVE_CORS")]
	permissive_cors: bool,
}

/// Shared server state.
///
/// # Invariants
/// - `composer` is `None` until every field model is available in `store`
struct AppState {
	store: DirectoryStore,
	data_dir: PathBuf,
	composer_config: ComposerConfig,
	composer: Option<DescriptionComposer>,
}

impl AppState {
	fn new(config: &ServerConfig) -> Self {
		Self {
			store: DirectoryStore::new(&config.models_dir),
			data_dir: config.data_dir.clone(),
			composer_config: ComposerConfig { semantic_context: config.semantic_context, seed: None },
			composer: None,
		}
	}

	/// (Re)loads the composer from the store and the data folder.
	fn reload(&mut self) -> rs_desc_core::Result<()> {
		let resources = Resources::load(&self.data_dir)?;
		self.composer = Some(DescriptionComposer::load(&self.store, resources, self.composer_config)?);
		Ok(())
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns one generated store page as JSON.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<AppState>>) -> impl Responder {
	let mut state = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Composer lock failed"),
	};

	let composer = match state.composer.as_mut() {
		Some(c) => c,
		None => return HttpResponse::ServiceUnavailable().body("Models are not loaded, train them with PUT /v1/train"),
	};

	match composer.compose() {
		Ok(description) => HttpResponse::Ok().json(description),
		Err(e) => {
			error!("Generation failed: {}", e);
			HttpResponse::InternalServerError().body(format!("Generation failed: {e}"))
		}
	}
}

/// HTTP GET endpoint `/v1/models`
///
/// Names of the stored models, one per line.
#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<AppState>>) -> impl Responder {
	let state = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Composer lock failed"),
	};

	match state.store.list() {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Retrains every model from the data folder, then reloads the composer.
/// Generation requests wait until training is over.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<AppState>>) -> impl Responder {
	let mut state = match data.lock() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Composer lock failed"),
	};

	let report = match pipeline::run(&state.data_dir, &state.store) {
		Ok(r) => r,
		Err(e) => {
			error!("Training failed: {}", e);
			return HttpResponse::InternalServerError().body(format!("Training failed: {e}"));
		}
	};

	match state.reload() {
		Ok(_) => HttpResponse::Ok().body(report.to_string()),
		Err(e) => {
			state.composer = None;
			HttpResponse::InternalServerError().body(format!("{report}Failed to load models: {e}"))
		}
	}
}

/// Registers every endpoint.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(get_models).service(put_train);
}

/// Main entry point for the server.
///
/// Loads the composer if models are already trained, wraps the state in a
/// `Mutex` and starts an Actix-web HTTP server.
///
/// # Notes
/// - Without trained models the server still starts; `/v1/generate`
///   answers 503 until `/v1/train` succeeds.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let config = ServerConfig::parse();
	let mut state = AppState::new(&config);
	match state.reload() {
		Ok(_) => info!("Models loaded from {}", config.models_dir.display()),
		Err(e) => warn!("Starting without models: {}", e),
	}
	let shared_state = web::Data::new(Mutex::new(state));

	info!("Listening on {}:{}", config.bind, config.port);
	let permissive_cors = config.permissive_cors;
	HttpServer::new(move || {
		let cors = if permissive_cors { Cors::permissive() } else { Cors::default() };
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(cors)
			.app_data(shared_state.clone())
			.configure(routes)
	})
		.bind((config.bind.as_str(), config.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn data_dir() -> PathBuf {
		PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
	}

	fn state(models_dir: &std::path::Path, data_dir: PathBuf) -> web::Data<Mutex<AppState>> {
		let config = ServerConfig::parse_from([
			"rs-desc-server",
			"--models-dir",
			models_dir.to_str().unwrap(),
			"--data-dir",
			data_dir.to_str().unwrap(),
		]);
		web::Data::new(Mutex::new(AppState::new(&config)))
	}

	#[actix_web::test]
	async fn generate_without_models_is_unavailable() {
		let models = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(state(models.path(), data_dir())).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
	}

	#[actix_web::test]
	async fn train_then_generate() {
		let models = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(state(models.path(), data_dir())).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/train").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/models").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let names = String::from_utf8(body.to_vec()).unwrap();
		assert!(names.lines().any(|name| name == "description"));
		assert!(names.lines().any(|name| name == "requirements_Sound_Card"));

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let page: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(page["system_requirements"][0]["name"], "OS");
		assert!(!page["description"][0]["title"].as_str().unwrap().is_empty());
	}

	#[actix_web::test]
	async fn training_on_a_missing_folder_fails() {
		let models = tempfile::tempdir().unwrap();
		let missing = models.path().join("no-data");
		let app = test::init_service(App::new().app_data(state(models.path(), missing)).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/train").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
