use serde_json::{Value, json};

fn nullable(inner: Value) -> Value {
    json!({ "anyOf": [inner, { "type": "null" }] })
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn array_of(item: Value) -> Value {
    json!({ "type": "array", "items": item })
}

fn coded_concept() -> Value {
    json!({
        "type": "object",
        "properties": {
            "coding": nullable(array_of(json!({
                "type": "object",
                "properties": {
                    "system": nullable(string()),
                    "code": nullable(string()),
                    "display": nullable(string())
                }
            }))),
            "text": nullable(string())
        }
    })
}

fn goal() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lifecycleStatus": {
                "type": "string",
                "enum": ["proposed", "planned", "accepted", "active", "on-hold",
                         "completed", "cancelled", "entered-in-error", "rejected"]
            },
            "category": nullable(array_of(coded_concept())),
            "continuous": nullable(json!({ "type": "boolean" })),
            "priority": nullable(json!({
                "type": "string",
                "enum": ["high-priority", "medium-priority", "low-priority"]
            })),
            "description": nullable(string()),
            "target": nullable(array_of(json!({
                "type": "object",
                "properties": { "measure": nullable(coded_concept()) }
            })))
        },
        "required": ["lifecycleStatus"]
    })
}

fn medication_request() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": string(),
            "intent": string(),
            "priority": nullable(json!({
                "type": "string",
                "enum": ["routine", "urgent", "asap", "stat"]
            })),
            "doNotPerform": nullable(json!({ "type": "boolean" })),
            "medication": coded_concept(),
            "reason": nullable(array_of(coded_concept()))
        },
        "required": ["status", "intent", "medication"]
    })
}

/// JSON schema of the structured output the analyzer asks the model for.
pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "patient": {
                "type": "object",
                "properties": {
                    "name": string(),
                    "age": { "type": "integer", "minimum": 0 },
                    "gender": { "type": "string", "enum": ["male", "female", "other", "unknown"] },
                    "birthDate": nullable(string())
                },
                "required": ["name", "age", "gender"]
            },
            "conditions": array_of(json!({
                "type": "object",
                "properties": {
                    "clinicalStatus": nullable(coded_concept()),
                    "verificationStatus": nullable(coded_concept()),
                    "category": nullable(array_of(coded_concept())),
                    "severity": nullable(coded_concept()),
                    "code": coded_concept(),
                    "bodySite": nullable(array_of(coded_concept())),
                    "onsetDateTime": nullable(string()),
                    "abatementDateTime": nullable(string()),
                    "recordedDate": nullable(string())
                },
                "required": ["code"]
            })),
            "carePlans": array_of(json!({
                "type": "object",
                "properties": {
                    "status": string(),
                    "intent": string(),
                    "title": nullable(string()),
                    "category": nullable(array_of(coded_concept())),
                    "description": nullable(string()),
                    "goal": nullable(array_of(goal())),
                    "medication": nullable(array_of(medication_request())),
                    "period": nullable(json!({
                        "type": "object",
                        "properties": { "start": nullable(string()), "end": nullable(string()) }
                    })),
                    "created": nullable(string())
                },
                "required": ["status", "intent"]
            }))
        },
        "required": ["patient", "conditions", "carePlans"]
    })
}
