//! Request bodies and query parameters.
//!
//! Every field is optional on the wire so that handlers can answer missing
//! input with the API's own messages instead of a deserializer error.

use serde::Deserialize;

use crate::lenient;

/// Opening hours as sent in an `openingTimes` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpeningTimeInput {
    #[serde(default)]
    pub days: Option<String>,
    #[serde(default)]
    pub opening: Option<String>,
    #[serde(default)]
    pub closing: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub closed: Option<bool>,
}

/// Body of `POST /api/locations`.
///
/// Opening hours arrive either as `openingTimes` or as the flat form fields
/// `days1`, `opening1`, `closing1`, `closed1` and their `2` counterparts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::facilities")]
    pub facilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub lat: Option<f64>,
    #[serde(default)]
    pub opening_times: Option<Vec<OpeningTimeInput>>,
    #[serde(default)]
    pub days1: Option<String>,
    #[serde(default)]
    pub opening1: Option<String>,
    #[serde(default)]
    pub closing1: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub closed1: Option<bool>,
    #[serde(default)]
    pub days2: Option<String>,
    #[serde(default)]
    pub opening2: Option<String>,
    #[serde(default)]
    pub closing2: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub closed2: Option<bool>,
}

impl CreateLocationRequest {
    /// Opening hours from whichever form the client used. An explicit
    /// `openingTimes` array wins over the flat fields; a flat group counts
    /// only when its `daysN` field is present.
    pub fn opening_time_inputs(&self) -> Vec<OpeningTimeInput> {
        if let Some(opening_times) = &self.opening_times {
            return opening_times.clone();
        }

        [
            OpeningTimeInput {
                days: self.days1.clone(),
                opening: self.opening1.clone(),
                closing: self.closing1.clone(),
                closed: self.closed1,
            },
            OpeningTimeInput {
                days: self.days2.clone(),
                opening: self.opening2.clone(),
                closing: self.closing2.clone(),
                closed: self.closed2,
            },
        ]
        .into_iter()
        .filter(|input| input.days.is_some())
        .collect()
    }
}

/// A numeric field that was present in the request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmittedNumber {
    Number(f64),
    /// Sent, but not a finite number.
    Unusable,
}

/// Body of `PUT /api/locations/{locationid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::facilities")]
    pub facilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::submitted_number")]
    pub lng: Option<SubmittedNumber>,
    #[serde(default, deserialize_with = "lenient::submitted_number")]
    pub lat: Option<SubmittedNumber>,
    #[serde(default)]
    pub opening_times: Option<Vec<OpeningTimeInput>>,
}

/// Body of `POST /api/locations/{locationid}/reviews`.
///
/// The author is never taken from the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_text: Option<String>,
}

/// Body of `PUT /api/locations/{locationid}/reviews/{reviewid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_text: Option<String>,
}

/// Body of `POST /api/register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Query string of `GET /api/locations`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityParams {
    #[serde(default)]
    pub lng: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub max_distance: Option<String>,
}
