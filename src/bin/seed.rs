// src/bin/seed.rs
// DOCUMENTATION: Seeds a running directory API with reference data
// PURPOSE: Signs in as an admin and creates Korean cities, categories and a
// handful of sample enterprises through the public HTTP surface

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::env;
use std::time::{Duration, Instant};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// (name, slug)
const CITIES: &[(&str, &str)] = &[
    ("서울", "seoul"),
    ("부산", "busan"),
    ("인천", "incheon"),
    ("대구", "daegu"),
    ("대전", "daejeon"),
    ("광주", "gwangju"),
    ("울산", "ulsan"),
    ("수원", "suwon"),
    ("제주", "jeju"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("한식", "korean-food"),
    ("카페", "cafe"),
    ("베이커리", "bakery"),
    ("미용실", "hair-salon"),
    ("병원", "clinic"),
    ("약국", "pharmacy"),
    ("헬스장", "gym"),
    ("숙박", "lodging"),
    ("IT 서비스", "it-services"),
    ("법률 사무소", "law-office"),
];

struct SampleEnterprise {
    name: &'static str,
    city: &'static str,
    category: &'static str,
    latitude: f64,
    longitude: f64,
    price_range: i16,
    short_description: &'static str,
}

const ENTERPRISES: &[SampleEnterprise] = &[
    SampleEnterprise {
        name: "을지로 골목식당",
        city: "seoul",
        category: "korean-food",
        latitude: 37.5663,
        longitude: 126.9910,
        price_range: 2,
        short_description: "Traditional Korean home cooking near Euljiro 3-ga",
    },
    SampleEnterprise {
        name: "Haeundae Roasters",
        city: "busan",
        category: "cafe",
        latitude: 35.1587,
        longitude: 129.1604,
        price_range: 2,
        short_description: "Specialty coffee a block from the beach",
    },
    SampleEnterprise {
        name: "Songdo Fitness Lab",
        city: "incheon",
        category: "gym",
        latitude: 37.3925,
        longitude: 126.6390,
        price_range: 3,
        short_description: "24-hour gym with personal training",
    },
    SampleEnterprise {
        name: "Hallasan Guesthouse",
        city: "jeju",
        category: "lodging",
        latitude: 33.4996,
        longitude: 126.5312,
        price_range: 1,
        short_description: "Budget rooms for hikers",
    },
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Taxon {
    id: String,
    slug: String,
}

#[derive(Default)]
struct Tally {
    created: u32,
    existing: u32,
    failed: u32,
}

struct Seeder {
    base_url: String,
    client: Client,
    token: String,
}

impl Seeder {
    async fn connect(base_url: String, email: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;

        let health = client
            .get(format!("{}/health/live", base_url))
            .send()
            .await
            .with_context(|| format!("service not reachable at {}", base_url))?;
        if !health.status().is_success() {
            bail!("health check returned {}", health.status());
        }

        let resp = client
            .post(format!("{}/auth/login", base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("login request")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("login failed: HTTP {} - {}", status, body);
        }
        let login: LoginResponse = resp.json().await.context("parsing login response")?;

        Ok(Self {
            base_url,
            client,
            token: login.access_token,
        })
    }

    /// Creates every entry, treating 409 as already present
    async fn seed_taxa(&self, kind: &str, entries: &[(&str, &str)]) -> Tally {
        let mut tally = Tally::default();

        for (name, slug) in entries {
            let result = self
                .client
                .post(format!("{}/{}", self.base_url, kind))
                .bearer_auth(&self.token)
                .json(&json!({ "name": name, "slug": slug }))
                .send()
                .await;

            match result {
                Ok(resp) if resp.status() == StatusCode::CREATED => {
                    println!("  {}+{} {} ({})", GREEN, RESET, name, slug);
                    tally.created += 1;
                }
                Ok(resp) if resp.status() == StatusCode::CONFLICT => {
                    println!("  {}={} {} ({})", YELLOW, RESET, name, slug);
                    tally.existing += 1;
                }
                Ok(resp) => {
                    println!("  {}x{} {}: HTTP {}", RED, RESET, name, resp.status());
                    tally.failed += 1;
                }
                Err(e) => {
                    println!("  {}x{} {}: {}", RED, RESET, name, e);
                    tally.failed += 1;
                }
            }
        }

        tally
    }

    async fn slug_ids(&self, kind: &str) -> Result<HashMap<String, String>> {
        let taxa: Vec<Taxon> = self
            .client
            .get(format!("{}/{}/all", self.base_url, kind))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("parsing /{}/all", kind))?;

        Ok(taxa.into_iter().map(|t| (t.slug, t.id)).collect())
    }

    async fn seed_enterprises(&self) -> Result<Tally> {
        let cities = self.slug_ids("cities").await?;
        let categories = self.slug_ids("categories").await?;
        let mut tally = Tally::default();

        for sample in ENTERPRISES {
            let body = json!({
                "name": sample.name,
                "shortDescription": sample.short_description,
                "cityId": cities.get(sample.city),
                "categoryIds": categories.get(sample.category).into_iter().collect::<Vec<_>>(),
                "latitude": sample.latitude,
                "longitude": sample.longitude,
                "priceRange": sample.price_range,
            });

            let resp = self
                .client
                .post(format!("{}/admin/enterprises", self.base_url))
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(resp) if resp.status().is_success() => {
                    println!("  {}+{} {}", GREEN, RESET, sample.name);
                    tally.created += 1;
                }
                Ok(resp) => {
                    println!("  {}x{} {}: HTTP {}", RED, RESET, sample.name, resp.status());
                    tally.failed += 1;
                }
                Err(e) => {
                    println!("  {}x{} {}: {}", RED, RESET, sample.name, e);
                    tally.failed += 1;
                }
            }
        }

        Ok(tally)
    }
}

fn print_tally(label: &str, tally: &Tally) {
    println!(
        "{:<14} {}{:>4} new{}  {}{:>4} existing{}  {}{:>4} failed{}",
        label, GREEN, tally.created, RESET, YELLOW, tally.existing, RESET, RED, tally.failed, RESET
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let base_url =
        env::var("DIRECTORY_API_URL").unwrap_or_else(|_| "http://localhost:3001/v1".to_string());
    let email = env::var("SEED_ADMIN_EMAIL").context("SEED_ADMIN_EMAIL must be set")?;
    let password = env::var("SEED_ADMIN_PASSWORD").context("SEED_ADMIN_PASSWORD must be set")?;
    let with_samples = env::args().any(|a| a == "--with-samples");

    println!("{}{}KoreaBiz directory seeder{} -> {}", BOLD, CYAN, RESET, base_url);
    let started = Instant::now();

    let seeder = Seeder::connect(base_url, &email, &password).await?;

    println!("\n{}Cities{}", BOLD, RESET);
    let cities = seeder.seed_taxa("cities", CITIES).await;
    println!("\n{}Categories{}", BOLD, RESET);
    let categories = seeder.seed_taxa("categories", CATEGORIES).await;

    let enterprises = if with_samples {
        println!("\n{}Sample enterprises{}", BOLD, RESET);
        Some(seeder.seed_enterprises().await?)
    } else {
        None
    };

    println!("\n{}Summary{}", BOLD, RESET);
    print_tally("cities", &cities);
    print_tally("categories", &categories);
    if let Some(tally) = &enterprises {
        print_tally("enterprises", tally);
    }
    println!("Done in {:.1}s", started.elapsed().as_secs_f64());

    Ok(())
}
