use std::sync::Mutex;

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use tweet_chain_core::{ChainError, GenerationInput, MarkovChain, StartSeed, tokenize};

mod config;

use config::ServerConfig;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_length: Option<usize>,
	seed: Option<String> // -> "random", "custom:<token>" or none (random)
}

#[derive(Deserialize)]
struct TokenizeQuery {
	text: String
}

#[derive(Deserialize)]
struct TrainQuery {
	limit: Option<usize>
}

struct SharedData {
	chain: MarkovChain,
	config: ServerConfig
}

impl GenerateParams {
	/// Determines the starting seed strategy for generation.
	fn start_seed(&self) -> Result<StartSeed, String> {
		match &self.seed {
			None => Ok(StartSeed::Random),
			Some(s) if s.to_lowercase() == "random" => Ok(StartSeed::Random),
			Some(s) if s.to_lowercase().starts_with("custom:") => {
				let value = s.get("custom:".len()..).unwrap_or_default();
				if value.is_empty() {
					Err("Custom seed cannot be empty".into())
				} else {
					Ok(StartSeed::Custom(value.to_owned()))
				}
			}
			Some(_) => Err("Seed must be 'random' or start with 'custom:'".into()),
		}
	}

	fn generation_input(&self, default_max_length: usize) -> Result<GenerationInput, String> {
		let mut input = GenerationInput::new(self.start_seed()?);
		input
			.set_max_length_chars(self.max_length.unwrap_or(default_max_length))
			.map_err(|e| e.to_string())?;
		Ok(input)
	}
}

/// Maps a core error onto an HTTP response.
fn error_response(error: ChainError) -> HttpResponse {
	match error {
		ChainError::UnknownContext(_) | ChainError::EmptyChain => HttpResponse::NotFound().body(error.to_string()),
		ChainError::InvalidParameter(_) => HttpResponse::BadRequest().body(error.to_string()),
		_ => {
			log::error!("{error}");
			HttpResponse::InternalServerError().body(error.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a post from the shared chain based on query parameters.
/// Returns 404 when the seed is not in the chain.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let input = match query.generation_input(shared_data.config.max_length_chars) {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};

	match shared_data.chain.generate_from(&input) {
		Ok(generated) => HttpResponse::Ok().body(generated.text),
		Err(e) => error_response(e),
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the shared chain on the request body, one post per line.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainQuery>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let posts = body.lines().map(str::trim).filter(|line| !line.is_empty());
	let consumed = shared_data.chain.train_texts(posts, query.limit);
	log::info!("Trained on {consumed} posts");
	HttpResponse::Ok().body(format!("Trained on {consumed} posts"))
}

#[get("/v1/tokenize")]
async fn get_tokens(query: web::Query<TokenizeQuery>) -> impl Responder {
	HttpResponse::Ok().json(tokenize(&query.text))
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	HttpResponse::Ok().json(shared_data.chain.stats())
}

/// HTTP PUT endpoint `/v1/save`
///
/// Writes the shared chain to the configured chain path.
#[put("/v1/save")]
async fn put_save(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	match shared_data.chain.save(&shared_data.config.chain_path) {
		Ok(()) => HttpResponse::Ok().body("Chain saved successfully"),
		Err(e) => error_response(e),
	}
}

/// HTTP PUT endpoint `/v1/load`
///
/// Replaces the shared chain with the one stored at the configured path.
/// The current chain is kept if the file is missing or invalid.
#[put("/v1/load")]
async fn put_load(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	match MarkovChain::load(&shared_data.config.chain_path) {
		Ok(chain) => {
			shared_data.chain = chain;
			HttpResponse::Ok().body("Chain loaded successfully")
		}
		Err(e) => error_response(e),
	}
}

/// Main entry point for the server.
///
/// Loads the configuration and, if present, the persisted chain, wraps the
/// chain in a `Mutex` and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::get()?;
	let chain = if config.chain_path.exists() {
		MarkovChain::load(&config.chain_path)?
	} else {
		log::info!("No chain at {}, starting empty", config.chain_path.display());
		MarkovChain::new()
	};

	let bind = (config.host.clone(), config.port);
	let shared_chain = web::Data::new(Mutex::new(SharedData { chain, config }));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_chain.clone())
			.service(get_generated)
			.service(put_train)
			.service(get_tokens)
			.service(get_stats)
			.service(put_save)
			.service(put_load)
	})
		.bind(bind)?
		.run()
		.await?;
	Ok(())
}
