//! A tiny Star Wars endpoint served through `StubTransport`.
//!
//! It resolves just enough of the schema to tell whether the client sent the
//! right operation and variables: `hero`, `person`, `planet` and the
//! `createReview` mutation.

#![allow(dead_code)]

use std::sync::Arc;

use horizon_graphql_client::{
    json_response, GraphQLClient, RecordedRequest, StubTransport, TransportError,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub const ENDPOINT: &str = "https://swapi.example/graphql";

/// A document with two named operations.
pub const PERSON_AND_PLANET: &str = r#"
query Person($personId: ID!) {
    person(personID: $personId) { name birthYear homeworld { name } }
}
query Planet($planetId: ID!) {
    planet(planetID: $planetId) { name climates }
}
"#;

pub const HERO: &str = "{ hero { name friends { name } } }";

pub const CREATE_REVIEW: &str = r#"
mutation CreateReviewForEpisode($ep: Episode!, $review: ReviewInput!) {
    createReview(episode: $ep, review: $review) { stars commentary }
}
"#;

#[derive(Debug, Deserialize)]
pub struct Person {
    pub name: String,
    pub birth_year: String,
    pub homeworld: Planet,
}

#[derive(Debug, Deserialize)]
pub struct Planet {
    pub name: String,
    #[serde(default)]
    pub climates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hero {
    pub name: String,
    pub friends: Vec<Friend>,
}

#[derive(Debug, Deserialize)]
pub struct Friend {
    pub name: String,
}

/// A stub transport answering like a small Star Wars API.
pub fn star_wars() -> Arc<StubTransport> {
    Arc::new(StubTransport::new(resolve))
}

/// A client wired to `transport`.
pub fn client_with(transport: Arc<StubTransport>) -> GraphQLClient {
    GraphQLClient::builder(ENDPOINT)
        .transport(transport)
        .build()
        .expect("valid client configuration")
}

fn resolve(request: &RecordedRequest) -> Result<http::Response<bytes::Bytes>, TransportError> {
    let (query, operation, variables) = if request.method == http::Method::GET {
        let variables = match request.query_param("variables") {
            Some(text) => serde_json::from_str(&text).map_err(bad_request)?,
            None => Value::Null,
        };
        (
            request.query_param("query").unwrap_or_default(),
            request.query_param("operationName"),
            variables,
        )
    } else {
        let body = request.json_body().map_err(bad_request)?;
        (
            body["query"].as_str().unwrap_or_default().to_string(),
            body["operationName"].as_str().map(str::to_string),
            body["variables"].clone(),
        )
    };

    let result = execute(&query, operation.as_deref(), &variables);
    Ok(json_response(200, result.to_string()))
}

fn bad_request(err: serde_json::Error) -> TransportError {
    TransportError::Other(format!("stub could not read request: {err}"))
}

fn execute(query: &str, operation: Option<&str>, variables: &Value) -> Value {
    let has_person = query.contains("query Person");
    let has_planet = query.contains("query Planet");

    match operation {
        Some("Person") if has_person => person(variables),
        Some("Planet") if has_planet => planet(variables),
        Some(other) => error(&format!("Unknown operation named \"{other}\".")),
        None if has_person && has_planet => {
            error("Must provide operation name if query contains multiple operations.")
        }
        None if has_person => person(variables),
        None if has_planet => planet(variables),
        None if query.contains("createReview") => create_review(variables),
        None if query.contains("hero") => hero(variables),
        None => error("Cannot query field on type \"Root\"."),
    }
}

fn error(message: &str) -> Value {
    json!({"errors": [{"message": message, "locations": [{"line": 1, "column": 1}]}]})
}

fn person(variables: &Value) -> Value {
    let person = match variables["personId"].as_str() {
        Some("1") => json!({
            "name": "Luke Skywalker",
            "birthYear": "19BBY",
            "homeworld": {"name": "Tatooine"}
        }),
        Some("4") => json!({
            "name": "Darth Vader",
            "birthYear": "41.9BBY",
            "homeworld": {"name": "Tatooine"}
        }),
        Some(_) => Value::Null,
        None => {
            return error("Variable \"$personId\" of required type \"ID!\" was not provided.");
        }
    };
    json!({"data": {"person": person}})
}

fn planet(variables: &Value) -> Value {
    let planet = match variables["planetId"].as_str() {
        Some("1") => json!({"name": "Tatooine", "climates": ["arid"]}),
        Some("2") => json!({"name": "Alderaan", "climates": ["temperate"]}),
        Some(_) => Value::Null,
        None => {
            return error("Variable \"$planetId\" of required type \"ID!\" was not provided.");
        }
    };
    json!({"data": {"planet": planet}})
}

fn hero(variables: &Value) -> Value {
    let hero = match variables["episode"].as_str() {
        Some("EMPIRE") => json!({
            "name": "Luke Skywalker",
            "friends": [{"name": "Han Solo"}, {"name": "Leia Organa"}, {"name": "C-3PO"}, {"name": "R2-D2"}]
        }),
        _ => json!({
            "name": "R2-D2",
            "friends": [{"name": "Luke Skywalker"}, {"name": "Han Solo"}, {"name": "Leia Organa"}]
        }),
    };
    json!({"data": {"hero": hero}})
}

fn create_review(variables: &Value) -> Value {
    let review = &variables["review"];
    json!({"data": {"createReview": {
        "stars": review["stars"],
        "commentary": review["commentaryText"]
    }}})
}
