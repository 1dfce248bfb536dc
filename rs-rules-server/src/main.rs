use std::env;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rs_rules_core::{Difficulty, ParameterEnvelope, ProviderConfig, QuestionProvider, Rule, RuleSet, SongManifest, Vocabulary};

/// Query parameters for `/v1/question`
#[derive(Deserialize)]
struct QuestionParams {
	song: usize,
	difficulty: String,
}

/// Query parameters for `/v1/rule_set`, mirroring the setup sliders
#[derive(Deserialize)]
struct RuleSetParams {
	difficulty: String,
	preceding: usize,
	following: usize,
	density: f32,
	stride: usize,
	length: Option<usize>,
	vocabulary: Option<usize>,
}

#[derive(Deserialize)]
struct RoundParams {
	difficulty: String,
}

struct SharedData {
	provider: QuestionProvider,
}

/// Parses a difficulty query value into a response-ready error.
fn parse_difficulty(value: &str) -> Result<Difficulty, HttpResponse> {
	value.parse::<Difficulty>().map_err(|e| HttpResponse::BadRequest().body(e.to_string()))
}

/// HTTP GET endpoint `/v1/songs`
///
/// Lists the songs of the manifest loaded at startup.
#[get("/v1/songs")]
async fn get_songs(manifest: web::Data<SongManifest>) -> impl Responder {
	HttpResponse::Ok().json(manifest.songs())
}

/// HTTP GET endpoint `/v1/question`
///
/// Returns the next question for a song and difficulty as JSON.
#[get("/v1/question")]
async fn get_question(
	data: web::Data<Mutex<SharedData>>,
	manifest: web::Data<SongManifest>,
	query: web::Query<QuestionParams>,
) -> impl Responder {
	let difficulty = match parse_difficulty(&query.difficulty) {
		Ok(d) => d,
		Err(response) => return response,
	};
	let song = match manifest.get(query.song) {
		Some(s) => s,
		None => return HttpResponse::NotFound().body(format!("Unknown song {}", query.song)),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Provider lock failed"),
	};

	match shared_data.provider.next_question(song, difficulty) {
		Ok(question) => HttpResponse::Ok().json(question),
		Err(e) => {
			error!(song = song.id, %difficulty, error = %e, "question generation failed");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP PUT endpoint `/v1/rule_set`
///
/// Installs a single-rule set for a difficulty, as the setup screen does.
#[put("/v1/rule_set")]
async fn put_rule_set(data: web::Data<Mutex<SharedData>>, query: web::Query<RuleSetParams>) -> impl Responder {
	let difficulty = match parse_difficulty(&query.difficulty) {
		Ok(d) => d,
		Err(response) => return response,
	};
	let rule = match Rule::new(query.preceding, query.following, query.density, query.stride) {
		Ok(r) => r,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	// Read the configured size, then build the rule set without holding the lock
	let vocabulary_size = match query.vocabulary {
		Some(size) => size,
		None => match data.lock() {
			Ok(shared_data) => shared_data.provider.config().vocabulary_size,
			Err(_) => return HttpResponse::InternalServerError().body("Provider lock failed"),
		},
	};
	let vocabulary = match Vocabulary::alphabet(vocabulary_size) {
		Ok(v) => v,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let rules = vec![rule];
	let envelope = ParameterEnvelope::covering(&rules);
	let rule_set = match RuleSet::new(rules, vocabulary, envelope, &mut StdRng::from_os_rng()) {
		Ok(r) => r,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let description = rule_set.user_facing_description();
	let length = query.length.unwrap_or(difficulty.string_length());

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Provider lock failed"),
	};
	if let Err(e) = shared_data.provider.install_rule_set(difficulty, rule_set, length) {
		return HttpResponse::BadRequest().body(e.to_string());
	}
	info!(%difficulty, length, "rule set installed from setup");

	HttpResponse::Ok().body(description)
}

/// HTTP PUT endpoint `/v1/next_round`
///
/// Moves a difficulty on to a similar rule set.
#[put("/v1/next_round")]
async fn put_next_round(data: web::Data<Mutex<SharedData>>, query: web::Query<RoundParams>) -> impl Responder {
	let difficulty = match parse_difficulty(&query.difficulty) {
		Ok(d) => d,
		Err(response) => return response,
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Provider lock failed"),
	};

	shared_data.provider.advance_round(difficulty);
	match shared_data.provider.current_rule_set(difficulty) {
		Some(rule_set) => HttpResponse::Ok().body(rule_set.user_facing_description()),
		None => HttpResponse::NotFound().body(format!("No round started for {difficulty}")),
	}
}

/// Main entry point for the server.
///
/// Loads the song manifest once, builds the question provider from the
/// environment, and starts an Actix-web HTTP server.
///
/// # Notes
/// - `RS_RULES_MANIFEST` sets the manifest path (default `./data/songs.json`).
/// - `RS_RULES_PORT` sets the port (default 5000); the server binds to 127.0.0.1.
/// - `RUST_LOG` controls log filtering (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let manifest_path = env::var("RS_RULES_MANIFEST").unwrap_or_else(|_| "./data/songs.json".to_owned());
	let port = env::var("RS_RULES_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(5000);

	let manifest = SongManifest::load(&manifest_path).map_err(std::io::Error::other)?;
	let provider = QuestionProvider::new(ProviderConfig::from_env()).map_err(std::io::Error::other)?;

	let manifest = web::Data::new(manifest);
	let shared_data = web::Data::new(Mutex::new(SharedData { provider }));

	info!(port, songs = manifest.len(), "serving questions");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.app_data(manifest.clone())
			.service(get_songs)
			.service(get_question)
			.service(put_rule_set)
			.service(put_next_round)
	})
		.bind(("127.0.0.1", port))?
		.run()
		.await
}
