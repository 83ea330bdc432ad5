//! Router-level integration tests against an in-memory store and a stub
//! prisoner directory.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use carefile_core::{
  directory::{PrisonerDirectory, PrisonerSummary},
  service::RecordService,
};
use carefile_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

/// Knows two prisoners; everyone else is a definitive negative lookup.
#[derive(Clone)]
struct StubDirectory;

const KNOWN: &str = "A1234AA";
const KNOWN_OTHER: &str = "B2345BB";

impl PrisonerDirectory for StubDirectory {
  type Error = std::convert::Infallible;

  async fn lookup(
    &self,
    prisoner_number: &str,
  ) -> Result<Option<PrisonerSummary>, Self::Error> {
    Ok(match prisoner_number {
      KNOWN => Some(PrisonerSummary {
        prisoner_number: KNOWN.to_owned(),
        prison_id:       "LEI".to_owned(),
        prison_name:     "Leeds".to_owned(),
      }),
      KNOWN_OTHER => Some(PrisonerSummary {
        prisoner_number: KNOWN_OTHER.to_owned(),
        prison_id:       "MDI".to_owned(),
        prison_name:     "Moorland".to_owned(),
      }),
      _ => None,
    })
  }
}

async fn make_router() -> Router<()> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let service = RecordService::new(Arc::new(store), Arc::new(StubDirectory));
  api_router(Arc::new(service))
}

async fn oneshot_raw(
  router: Router<()>,
  method: &str,
  uri: &str,
  headers: Vec<(header::HeaderName, &str)>,
  body: &str,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let req = builder.body(Body::from(body.to_string())).unwrap();
  router.oneshot(req).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn json_headers(username: &str) -> Vec<(header::HeaderName, &str)> {
  vec![
    (header::CONTENT_TYPE, "application/json"),
    (header::HeaderName::from_static("x-username"), username),
  ]
}

async fn put_json(router: Router<()>, uri: &str, body: Value) -> StatusCode {
  oneshot_raw(router, "PUT", uri, json_headers("USER1"), &body.to_string())
    .await
    .status()
}

// ── Diet and allergy ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_for_prisoner_without_record_returns_404() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "GET",
    "/prisoners/A1234AA/diet-and-allergy",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_creates_record_and_returns_resolved_projection() {
  let router = make_router().await;
  let body = json!({
    "foodAllergies": [
      { "value": "FOOD_ALLERGY_MILK", "comment": "reacts severely" }
    ],
    "cateringInstructions": "No dairy on the tray"
  });
  let res = oneshot_raw(
    router.clone(),
    "PUT",
    "/prisoners/A1234AA/diet-and-allergy",
    json_headers("USER1"),
    &body.to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::OK);

  let view = body_json(res).await;
  assert_eq!(view["prisonerNumber"], "A1234AA");

  let allergies = &view["foodAllergies"];
  assert_eq!(allergies["lastModifiedBy"], "USER1");
  assert_eq!(allergies["lastModifiedPrisonId"], "LEI");
  assert_eq!(allergies["value"][0]["value"]["description"], "Milk");
  assert_eq!(allergies["value"][0]["comment"], "reacts severely");

  assert_eq!(
    view["cateringInstructions"]["value"],
    "No dairy on the tray"
  );
  assert!(view.get("smokerStatus").is_none());
}

#[tokio::test]
async fn put_with_unknown_code_returns_400_naming_the_code() {
  let router = make_router().await;
  let body = json!({
    "foodAllergies": [{ "value": "FOOD_ALLERGY_PLUTONIUM" }]
  });
  let res = oneshot_raw(
    router,
    "PUT",
    "/prisoners/A1234AA/diet-and-allergy",
    json_headers("USER1"),
    &body.to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);

  let error = body_json(res).await;
  let message = error["error"].as_str().unwrap();
  assert!(message.contains("FOOD_ALLERGY_PLUTONIUM"), "{message}");
}

#[tokio::test]
async fn put_with_code_from_wrong_domain_returns_400() {
  let router = make_router().await;
  let body = json!({
    "medicalDiet": [{ "value": "FOOD_ALLERGY_MILK" }]
  });
  let status = put_json(
    router,
    "/prisoners/A1234AA/diet-and-allergy",
    body,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_for_unknown_prisoner_returns_400() {
  let router = make_router().await;
  let status = put_json(
    router,
    "/prisoners/X0000XX/diet-and-allergy",
    json!({ "cateringInstructions": "anything" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_without_username_header_returns_400() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "PUT",
    "/prisoners/A1234AA/diet-and-allergy",
    vec![(header::CONTENT_TYPE, "application/json")],
    &json!({ "cateringInstructions": "x" }).to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn smoker_update_does_not_touch_diet_metadata() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "foodAllergies": [{ "value": "FOOD_ALLERGY_MILK" }] }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let res = oneshot_raw(
    router.clone(),
    "PUT",
    "/prisoners/A1234AA/smoker",
    vec![
      (header::CONTENT_TYPE, "application/json"),
      (header::HeaderName::from_static("x-username"), "USER2"),
    ],
    &json!({ "smokerStatus": "SMOKER_VAPER" }).to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::OK);

  let view = body_json(
    oneshot_raw(
      router,
      "GET",
      "/prisoners/A1234AA/diet-and-allergy",
      vec![],
      "",
    )
    .await,
  )
  .await;
  assert_eq!(view["foodAllergies"]["lastModifiedBy"], "USER1");
  assert_eq!(view["smokerStatus"]["lastModifiedBy"], "USER2");
  assert_eq!(
    view["smokerStatus"]["value"]["description"],
    "Vaper or uses nicotine replacement"
  );
}

// ── Subject access ──────────────────────────────────────────────────────────

#[tokio::test]
async fn sar_with_no_data_returns_204() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "GET",
    "/subject-access-request?prn=A1234AA",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn sar_returns_timeline_with_resolved_descriptions() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "foodAllergies": [{ "value": "FOOD_ALLERGY_MILK" }] }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let res = oneshot_raw(
    router,
    "GET",
    "/subject-access-request?prn=A1234AA",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::OK);

  let report = body_json(res).await;
  assert_eq!(report["prisonerNumber"], "A1234AA");
  let content = report["content"].as_array().unwrap();
  assert_eq!(content.len(), 1);
  assert_eq!(content[0]["field"], "Food allergies");
  assert_eq!(content[0]["value"][0]["value"], "Milk");
  assert_eq!(content[0]["lastModifiedBy"], "USER1");
  assert_eq!(content[0]["prisonId"], "LEI");
}

#[tokio::test]
async fn sar_window_after_all_data_falls_back_to_one_row_per_field() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({
      "foodAllergies": [{ "value": "FOOD_ALLERGY_SOYA" }],
      "cateringInstructions": "soft diet"
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // Supersede the allergy list so the field has two history rows.
  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "foodAllergies": [{ "value": "FOOD_ALLERGY_EGG" }] }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // A window starting tomorrow has no in-window rows; each field falls back
  // to its single latest pre-window row.
  let tomorrow = chrono::Utc::now()
    .date_naive()
    .succ_opt()
    .unwrap()
    .format("%Y-%m-%d")
    .to_string();
  let uri = format!(
    "/subject-access-request?prn=A1234AA&fromDate={tomorrow}&toDate={tomorrow}"
  );
  let res = oneshot_raw(router, "GET", &uri, vec![], "").await;
  assert_eq!(res.status(), StatusCode::OK);

  let report = body_json(res).await;
  let content = report["content"].as_array().unwrap();
  assert_eq!(content.len(), 2);
  let allergy_entry = content
    .iter()
    .find(|e| e["field"] == "Food allergies")
    .unwrap();
  assert_eq!(allergy_entry["value"][0]["value"], "Egg");
}

#[tokio::test]
async fn sar_window_before_any_data_falls_back_to_nothing() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "cateringInstructions": "soft diet" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // A window entirely before the write has no in-window rows and no
  // pre-window history either.
  let res = oneshot_raw(
    router,
    "GET",
    "/subject-access-request?prn=A1234AA&fromDate=2001-01-01&toDate=2001-01-31",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

// ── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reference_domains_are_listed() {
  let router = make_router().await;
  let res =
    oneshot_raw(router, "GET", "/reference-data/domains", vec![], "").await;
  assert_eq!(res.status(), StatusCode::OK);

  let domains = body_json(res).await;
  let codes: Vec<&str> = domains
    .as_array()
    .unwrap()
    .iter()
    .map(|d| d["code"].as_str().unwrap())
    .collect();
  assert_eq!(
    codes,
    ["FOOD_ALLERGY", "MEDICAL_DIET", "PERSONALISED_DIET", "SMOKER"]
  );
}

#[tokio::test]
async fn reference_domain_lookup_404s_when_absent() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "GET",
    "/reference-data/domains/SHOE_SIZE",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reference_code_lookup_resolves_by_id() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "GET",
    "/reference-data/codes/MEDICAL_DIET_COELIAC",
    vec![],
    "",
  )
  .await;
  assert_eq!(res.status(), StatusCode::OK);

  let code = body_json(res).await;
  assert_eq!(code["domain"], "MEDICAL_DIET");
  assert_eq!(code["description"], "Coeliac (cannot eat gluten)");
}

// ── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn received_event_for_unknown_record_is_acknowledged() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "POST",
    "/events",
    vec![(header::CONTENT_TYPE, "application/json")],
    &json!({
      "messageId": "3f1f9e36-0000-4000-8000-000000000001",
      "eventType": "prisoner.received",
      "prisonerNumber": "A1234AA"
    })
    .to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn received_event_for_existing_record_writes_no_history() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "cateringInstructions": "soft diet" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let res = oneshot_raw(
    router.clone(),
    "POST",
    "/events",
    vec![(header::CONTENT_TYPE, "application/json")],
    &json!({
      "messageId": "3f1f9e36-0000-4000-8000-000000000004",
      "eventType": "prisoner.received",
      "prisonerNumber": "A1234AA"
    })
    .to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);

  // Metadata untouched and still exactly one history row.
  let view = body_json(
    oneshot_raw(
      router.clone(),
      "GET",
      "/prisoners/A1234AA/diet-and-allergy",
      vec![],
      "",
    )
    .await,
  )
  .await;
  assert_eq!(view["cateringInstructions"]["lastModifiedBy"], "USER1");

  let report = body_json(
    oneshot_raw(
      router,
      "GET",
      "/subject-access-request?prn=A1234AA",
      vec![],
      "",
    )
    .await,
  )
  .await;
  assert_eq!(report["content"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn merge_event_is_acknowledged_without_side_effects() {
  let router = make_router().await;

  let status = put_json(
    router.clone(),
    "/prisoners/A1234AA/diet-and-allergy",
    json!({ "cateringInstructions": "halal" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let res = oneshot_raw(
    router.clone(),
    "POST",
    "/events",
    vec![(header::CONTENT_TYPE, "application/json")],
    &json!({
      "messageId": "3f1f9e36-0000-4000-8000-000000000002",
      "eventType": "prisoner.merged",
      "prisonerNumber": "A1234AA",
      "removedPrisonerNumber": "B2345BB"
    })
    .to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);

  let view = body_json(
    oneshot_raw(
      router,
      "GET",
      "/prisoners/A1234AA/diet-and-allergy",
      vec![],
      "",
    )
    .await,
  )
  .await;
  assert_eq!(view["cateringInstructions"]["lastModifiedBy"], "USER1");
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
  let router = make_router().await;
  let res = oneshot_raw(
    router,
    "POST",
    "/events",
    vec![(header::CONTENT_TYPE, "application/json")],
    &json!({
      "messageId": "3f1f9e36-0000-4000-8000-000000000003",
      "eventType": "prisoner.teleported",
      "prisonerNumber": "A1234AA"
    })
    .to_string(),
  )
  .await;
  assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
