//! Star Wars demonstration schema
//!
//! Backs the `quiver` binary and the test suites. `hero` returns R2-D2
//! unless asked for the Empire Strikes Back hero.

use serde_json::{json, Value as JsonValue};

use crate::schema::{
    ArgumentDef, EnumType, FieldDef, FieldError, ObjectType, ResolveParams, Schema, SchemaError,
    TypeRef,
};

fn characters() -> Vec<JsonValue> {
    vec![
        json!({"id": "1000", "name": "Luke Skywalker", "friendIds": ["1002", "1003", "2000", "2001"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"], "homePlanet": "Tatooine"}),
        json!({"id": "1001", "name": "Darth Vader", "friendIds": ["1004"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"], "homePlanet": "Tatooine"}),
        json!({"id": "1002", "name": "Han Solo", "friendIds": ["1000", "1003", "2001"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"]}),
        json!({"id": "1003", "name": "Leia Organa", "friendIds": ["1000", "1002", "2000", "2001"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"], "homePlanet": "Alderaan"}),
        json!({"id": "1004", "name": "Wilhuff Tarkin", "friendIds": ["1001"],
               "appearsIn": ["NEWHOPE"]}),
        json!({"id": "2000", "name": "C-3PO", "friendIds": ["1000", "1002", "1003", "2001"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"], "primaryFunction": "Protocol"}),
        json!({"id": "2001", "name": "R2-D2", "friendIds": ["1000", "1002", "1003"],
               "appearsIn": ["NEWHOPE", "EMPIRE", "JEDI"], "primaryFunction": "Astromech"}),
    ]
}

/// Look a character up by id; `Null` when there is none
pub fn character(id: &str) -> JsonValue {
    characters()
        .into_iter()
        .find(|c| c["id"] == id)
        .unwrap_or(JsonValue::Null)
}

fn hero(params: ResolveParams) -> Result<JsonValue, FieldError> {
    match params.arg_str("episode") {
        Some("EMPIRE") => Ok(character("1000")),
        _ => Ok(character("2001")),
    }
}

fn friends(params: ResolveParams) -> Result<JsonValue, FieldError> {
    let ids = params
        .source
        .get("friendIds")
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(JsonValue::Array(
        ids.iter()
            .filter_map(JsonValue::as_str)
            .map(character)
            .collect(),
    ))
}

fn create_review(params: ResolveParams) -> Result<JsonValue, FieldError> {
    let stars = params
        .arg_i64("stars")
        .ok_or_else(|| FieldError::new("stars is required"))?;
    if !(1..=5).contains(&stars) {
        return Err(FieldError::new(format!("Rating must be between 1 and 5, got {}", stars))
            .extension("code", json!("BAD_RATING")));
    }

    Ok(json!({
        "episode": params.arg("episode").cloned().unwrap_or(JsonValue::Null),
        "stars": stars,
        "commentary": params.arg("commentary").cloned().unwrap_or(JsonValue::Null),
    }))
}

pub fn star_wars_schema() -> Result<Schema, SchemaError> {
    let episode = EnumType::new("Episode", ["NEWHOPE", "EMPIRE", "JEDI"])
        .description("One of the films in the Star Wars Trilogy");

    let character_type = ObjectType::new("Character")
        .description("A character in the Star Wars Trilogy")
        .field(FieldDef::new("id", TypeRef::required("String")))
        .field(FieldDef::new("name", TypeRef::named("String")))
        .field(
            FieldDef::new("friends", TypeRef::list(TypeRef::named("Character")))
                .resolve_sync(friends),
        )
        .field(FieldDef::new("appearsIn", TypeRef::list(TypeRef::named("Episode"))))
        .field(FieldDef::new("homePlanet", TypeRef::named("String")))
        .field(FieldDef::new("primaryFunction", TypeRef::named("String")));

    let review = ObjectType::new("Review")
        .field(FieldDef::new("episode", TypeRef::named("Episode")))
        .field(FieldDef::new("stars", TypeRef::required("Int")))
        .field(FieldDef::new("commentary", TypeRef::named("String")));

    let by_id = |name: &str| {
        FieldDef::new(name, TypeRef::named("Character"))
            .argument(ArgumentDef::new("id", TypeRef::required("String")))
            .resolve_sync(|params| Ok(character(params.arg_str("id").unwrap_or_default())))
    };

    let query = ObjectType::new("Query")
        .field(
            FieldDef::new("hero", TypeRef::named("Character"))
                .argument(ArgumentDef::new("episode", TypeRef::named("Episode")))
                .resolve_sync(hero),
        )
        .field(by_id("human"))
        .field(by_id("droid"));

    let mutation = ObjectType::new("Mutation").field(
        FieldDef::new("createReview", TypeRef::named("Review"))
            .argument(ArgumentDef::new("episode", TypeRef::required("Episode")))
            .argument(ArgumentDef::new("stars", TypeRef::required("Int")))
            .argument(ArgumentDef::new("commentary", TypeRef::named("String")))
            .resolve_sync(create_review),
    );

    Schema::builder(query)
        .mutation(mutation)
        .register(character_type)
        .register(review)
        .register(episode)
        .build()
}
