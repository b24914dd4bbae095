//! REST handlers.
//!
//! Clinician routes manage patients and diagnoses; patient routes expose only the caller's own
//! records. Store calls are synchronous and short, so handlers call them inline.

use api_shared::{issue_token, verify_password, HealthRes, HealthService};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
    Form,
};
use fhir::{diagnosis_document, patient_to_fhir, Bundle, PatientResource};
use records_core::{
    Codes, CombinedEntry, Diagnosis, NewDiagnosis, NewPatient, Patient, Role, User,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const CLINICIANS_ONLY: &str = "Clinicians only";
const PATIENTS_ONLY: &str = "Patients only";

/// Login form fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

/// Issued bearer token and the identity it is bound to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub access_token: String,
    pub token_type: String,
    pub username: String,
    pub role: String,
    pub id: String,
}

/// A user account as exposed over the API; the password hash never leaves the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub username: String,
    pub role: String,
    pub id: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role.to_string(),
            id: user.id,
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = LoginReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session issued", body = LoginRes),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
/// Exchange a username and password for a bearer token.
///
/// Unknown users and wrong passwords get the same response.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginReq>, FormRejection>,
) -> ApiResult<Json<LoginRes>> {
    let Form(req) = form?;
    let user = state
        .store
        .find_user(&req.username)
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| {
            tracing::info!("failed login for {}", req.username);
            ApiError::Unauthenticated("Invalid credentials")
        })?;

    let token = issue_token();
    state.store.create_session(&token, &user)?;
    tracing::info!("{} logged in as {}", user.username, user.role);

    Ok(Json(LoginRes {
        access_token: token,
        token_type: "bearer".into(),
        username: user.username,
        role: user.role.to_string(),
        id: user.id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    state.store.delete_session(&current.token)?;
    tracing::info!("{} logged out", current.user.username);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "User accounts", body = Vec<UserSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Clinicians only")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    let users = state.store.load_users().into_iter().map(UserSummary::from);
    Ok(Json(users.collect()))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    responses(
        (status = 201, description = "Patient created"),
        (status = 400, description = "Name missing"),
        (status = 409, description = "Requested id already in use"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a patient. The id is assigned by the store unless the payload carries one.
pub async fn create_patient(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    let Json(payload) = payload?;
    let patient = state.store.create_patient(payload)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient record"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<Patient>> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    state
        .store
        .get_patient(id)
        .map(Json)
        .ok_or(ApiError::NotFound("Patient not found"))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/fhir",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "FHIR Patient resource"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_fhir(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<PatientResource>> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    let patient = state
        .store
        .get_patient(id)
        .ok_or(ApiError::NotFound("Patient not found"))?;
    Ok(Json(patient_to_fhir(&patient)))
}

#[utoipa::path(
    post,
    path = "/api/diagnoses",
    responses(
        (status = 201, description = "Diagnosis recorded"),
        (status = 400, description = "patient_id missing"),
        (status = 409, description = "Requested id already in use"),
        (status = 500, description = "Internal server error")
    )
)]
/// Record a diagnosis. The timestamp defaults to now when the payload has none.
pub async fn create_diagnosis(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<NewDiagnosis>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Diagnosis>)> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    let Json(payload) = payload?;
    let diagnosis = state.store.create_diagnosis(payload)?;
    Ok((StatusCode::CREATED, Json(diagnosis)))
}

#[utoipa::path(
    get,
    path = "/api/records",
    responses(
        (status = 200, description = "All patients then all diagnoses, each tagged with its type"),
        (status = 403, description = "Clinicians only")
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<CombinedEntry>>> {
    current.require_role(Role::Clinician, CLINICIANS_ONLY)?;
    Ok(Json(state.store.combined_view()))
}

#[utoipa::path(
    get,
    path = "/api/myrecords",
    responses(
        (status = 200, description = "The caller's own patient record and diagnoses"),
        (status = 403, description = "Patients only")
    )
)]
pub async fn my_records(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<CombinedEntry>>> {
    current.require_role(Role::Patient, PATIENTS_ONLY)?;
    Ok(Json(
        state.store.records_for_patient(current.user.patient_ref()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/records/{id}/fhir",
    params(("id" = String, Path, description = "Diagnosis id")),
    responses(
        (status = 200, description = "FHIR document bundle for the diagnosis"),
        (status = 403, description = "Diagnosis belongs to another patient"),
        (status = 404, description = "Diagnosis not found")
    )
)]
/// A diagnosis as a FHIR document bundle.
///
/// Clinicians may fetch any diagnosis; patients only their own.
pub async fn record_fhir(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Bundle>> {
    let diagnosis = id
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|id| state.store.get_diagnosis(id))
        .ok_or(ApiError::NotFound("Diagnosis not found"))?;

    if current.user.role == Role::Patient
        && diagnosis.patient_id.to_string() != current.user.patient_ref()
    {
        return Err(ApiError::Forbidden("Forbidden"));
    }

    Ok(Json(diagnosis_document(&diagnosis)))
}

#[utoipa::path(
    get,
    path = "/api/codes",
    responses(
        (status = 200, description = "NAMASTE and ICD-11 code lists")
    )
)]
pub async fn codes(State(state): State<AppState>) -> Json<Codes> {
    Json(state.store.codes())
}
