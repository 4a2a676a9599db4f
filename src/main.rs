//! loan-simulator CLI
//!
//! Run loan simulations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Simulate one request against the built-in catalog
//! loan-simulator simulate --request request.json
//!
//! # Use a custom catalog and output JSON
//! loan-simulator simulate --request request.json --catalog products.json --format json
//!
//! # List active products
//! loan-simulator products
//!
//! # Generate random requests and run them as a batch
//! loan-simulator generate --product-id 1 --count 500 --seed 7 --output requests.json
//! loan-simulator batch --requests requests.json
//! ```

use loan_simulator::core::catalog::ProductCatalog;
use loan_simulator::core::loan_type::LoanType;
use loan_simulator::core::product::ProductId;
use loan_simulator::core::request::SimulationRequest;
use loan_simulator::engine::config::EngineConfig;
use loan_simulator::engine::simulator::SimulationEngine;
use loan_simulator::simulation::stress_test::{generate_requests, run_batch, RequestConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"loan-simulator — loan pricing and amortization engine

USAGE:
    loan-simulator <COMMAND> [OPTIONS]

COMMANDS:
    simulate    Simulate a single loan request
    products    List the active products in a catalog
    generate    Generate random requests for a product (for testing)
    batch       Simulate a file of requests and report outcomes
    help        Show this message

OPTIONS (all commands):
    --catalog <FILE>    Product catalog JSON (default: built-in products)

OPTIONS (simulate, batch):
    --config <FILE>     Engine configuration JSON (missing fields use defaults)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (simulate):
    --request <FILE>    Path to JSON request file

OPTIONS (products):
    --type <TYPE>       Only list products of this type: home, vehicle, personal
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --product-id <ID>   Product to generate requests for (required)
    --count <N>         Number of requests (default: 100)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

OPTIONS (batch):
    --requests <FILE>   Path to JSON requests file (as written by generate)

EXAMPLES:
    loan-simulator simulate --request request.json
    loan-simulator simulate --request request.json --format json
    loan-simulator products --type home
    loan-simulator generate --product-id 3 --count 200 --seed 42 --output requests.json
    loan-simulator batch --requests requests.json --config engine.json"#
    );
}

/// File schema shared by `generate` output and `batch` input.
#[derive(Serialize, Deserialize)]
struct RequestsFile {
    requests: Vec<SimulationRequest>,
}

/// JSON output for a rejected simulation.
#[derive(Serialize)]
struct RejectionOutput {
    error: &'static str,
    field: Option<&'static str>,
    message: String,
}

fn read_json<T: DeserializeOwned>(path: &str, expected: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON in '{}': {}", path, e);
        eprintln!("Expected format:");
        eprintln!("{}", expected);
        process::exit(1);
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn load_catalog(path: Option<&str>) -> ProductCatalog {
    match path {
        Some(path) => read_json(
            path,
            r#"{
  "products": [
    { "id": 1, "name": "Home Loan", "type": "home", "min_amount": "50000", "max_amount": "1000000",
      "min_term_months": 60, "max_term_months": 360, "base_rate": "4.5",
      "max_ltv": "80", "max_dti": "36", "origination_fee_percent": "0.5" }
  ]
}"#,
        ),
        None => ProductCatalog::with_defaults(),
    }
}

fn load_config(path: Option<&str>) -> EngineConfig {
    match path {
        Some(path) => read_json(
            path,
            r#"{ "apr_tolerance": "0.000001", "apr_max_iterations": 100, "band_refinement_passes": 4 }"#,
        ),
        None => EngineConfig::default(),
    }
}

/// Value following an option flag, or exit with `message`.
fn option_value(args: &[String], i: usize, message: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn numeric_option<T: std::str::FromStr>(args: &[String], i: usize, message: &str) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn cmd_simulate(args: &[String]) {
    let mut request_path = None;
    let mut catalog_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--request" => {
                i += 1;
                request_path = Some(option_value(args, i, "--request requires a file path"));
            }
            "--catalog" => {
                i += 1;
                catalog_path = Some(option_value(args, i, "--catalog requires a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config requires a file path"));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format requires 'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = request_path.unwrap_or_else(|| {
        eprintln!("Error: --request <FILE> is required");
        process::exit(1);
    });

    let request: SimulationRequest = read_json(
        &path,
        r#"{ "product_id": 1, "loan_type": "home", "loan_amount": "200000",
  "loan_term_months": 240, "income": "60000", "property_value": "250000" }"#,
    );
    let catalog = load_catalog(catalog_path.as_deref());
    let engine = SimulationEngine::new(load_config(config_path.as_deref()));

    match engine.simulate_from_catalog(&catalog, &request) {
        Ok(result) => {
            if format == "json" {
                println!("{}", to_json(&result));
            } else {
                println!("{}", result);
            }
        }
        Err(err) => {
            if format == "json" {
                let output = RejectionOutput {
                    error: err.kind(),
                    field: err.field(),
                    message: err.to_string(),
                };
                println!("{}", to_json(&output));
            } else {
                eprintln!("Simulation rejected ({}): {}", err.kind(), err);
            }
            process::exit(1);
        }
    }
}

fn cmd_products(args: &[String]) {
    let mut catalog_path = None;
    let mut loan_type: Option<LoanType> = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" => {
                i += 1;
                catalog_path = Some(option_value(args, i, "--catalog requires a file path"));
            }
            "--type" => {
                i += 1;
                let raw = option_value(args, i, "--type requires home, vehicle or personal");
                loan_type = Some(raw.parse().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format requires 'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let catalog = load_catalog(catalog_path.as_deref());
    let products: Vec<_> = match loan_type {
        Some(loan_type) => catalog.products_of_type(loan_type).collect(),
        None => catalog.active_products().collect(),
    };

    if format == "json" {
        println!("{}", to_json(&products));
        return;
    }

    if products.is_empty() {
        println!("No active products.");
        return;
    }
    for product in products {
        println!("[{}] {} ({})", product.id, product.name, product.loan_type);
        println!(
            "    Amount:    {} - {}",
            product.min_amount, product.max_amount
        );
        println!(
            "    Term:      {} - {} months",
            product.min_term_months, product.max_term_months
        );
        println!("    Base rate: {}%", product.base_rate);
        match product.max_ltv {
            Some(ltv) => println!("    Max LTV:   {}%", ltv),
            None => println!("    Max LTV:   n/a"),
        }
        println!("    Max DTI:   {}%", product.max_dti);
        println!("    Fee:       {}%", product.origination_fee_percent);
        let tiers: Vec<&str> = product
            .risk_bands
            .bands()
            .iter()
            .chain(std::iter::once(product.risk_bands.fallback()))
            .map(|band| band.tier.as_str())
            .collect();
        println!("    Tiers:     {}", tiers.join(", "));
    }
}

fn cmd_generate(args: &[String]) {
    let mut product_id: Option<u32> = None;
    let mut catalog_path = None;
    let mut output_path: Option<String> = None;
    let mut config = RequestConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--product-id" => {
                i += 1;
                product_id = Some(numeric_option(args, i, "--product-id requires a number"));
            }
            "--count" => {
                i += 1;
                config.count = numeric_option(args, i, "--count requires a number");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(numeric_option(args, i, "--seed requires a number"));
            }
            "--catalog" => {
                i += 1;
                catalog_path = Some(option_value(args, i, "--catalog requires a file path"));
            }
            "--output" => {
                i += 1;
                output_path = Some(option_value(args, i, "--output requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let id = ProductId::new(product_id.unwrap_or_else(|| {
        eprintln!("Error: --product-id <ID> is required");
        process::exit(1);
    }));

    let catalog = load_catalog(catalog_path.as_deref());
    let product = catalog.active(id).unwrap_or_else(|| {
        eprintln!("Product {} is not an active product in the catalog", id);
        process::exit(1);
    });

    let output = RequestsFile {
        requests: generate_requests(product, &config),
    };
    let json = to_json(&output);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} requests for product {} → {}",
            output.requests.len(),
            id,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn cmd_batch(args: &[String]) {
    let mut requests_path = None;
    let mut catalog_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--requests" => {
                i += 1;
                requests_path = Some(option_value(args, i, "--requests requires a file path"));
            }
            "--catalog" => {
                i += 1;
                catalog_path = Some(option_value(args, i, "--catalog requires a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config requires a file path"));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format requires 'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = requests_path.unwrap_or_else(|| {
        eprintln!("Error: --requests <FILE> is required");
        process::exit(1);
    });

    let file: RequestsFile = read_json(
        &path,
        r#"{ "requests": [ { "product_id": 3, "loan_type": "personal", "loan_amount": "10000",
  "loan_term_months": 36, "income": "60000" } ] }"#,
    );
    let catalog = load_catalog(catalog_path.as_deref());
    let engine = SimulationEngine::new(load_config(config_path.as_deref()));

    let report = run_batch(&engine, &catalog, &file.requests);
    if format == "json" {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simulate" => cmd_simulate(rest),
        "products" => cmd_products(rest),
        "generate" => cmd_generate(rest),
        "batch" => cmd_batch(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
