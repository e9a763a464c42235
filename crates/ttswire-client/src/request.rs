use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;
use crate::error::{ClientError, Result};

/// Cluster used for cloned voices (voice ids starting with `S_`).
pub const CLUSTER_ICL: &str = "volcano_icl";
/// Cluster used for stock voices.
pub const CLUSTER_TTS: &str = "volcano_tts";

/// Value of `app.token` in the request body. The vendor authenticates the
/// connection through the `Authorization` header and ignores this field.
pub const TOKEN_PLACEHOLDER: &str = "access_token";

const OPERATION_SUBMIT: &str = "submit";
const EXTRA_PARAM: &str = r#"{"disable_markdown_filter":false}"#;

/// Audio container/codec requested from the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    #[default]
    Wav,
    Mp3,
    OggOpus,
    Pcm,
}

impl AudioEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            AudioEncoding::Wav => "wav",
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg_opus",
            AudioEncoding::Pcm => "pcm",
        }
    }

    /// Conventional file extension for the encoding.
    pub fn extension(self) -> &'static str {
        match self {
            AudioEncoding::Wav => "wav",
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg",
            AudioEncoding::Pcm => "pcm",
        }
    }
}

/// Parameters of one synthesis. Credentials live in [`AuthConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_type: String,
    /// Derived from `voice_type` when absent, see [`cluster_for_voice`].
    pub cluster: Option<String>,
    pub encoding: AudioEncoding,
    pub speed_ratio: f64,
    /// Caller identifier; a random one is generated when absent.
    pub uid: Option<String>,
    /// Request identifier; a random one is generated when absent.
    pub request_id: Option<String>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_type: voice_type.into(),
            cluster: None,
            encoding: AudioEncoding::default(),
            speed_ratio: 1.0,
            uid: None,
            request_id: None,
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_speed_ratio(mut self, speed_ratio: f64) -> Self {
        self.speed_ratio = speed_ratio;
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The cluster this request is routed to.
    pub fn resolved_cluster(&self) -> &str {
        self.cluster
            .as_deref()
            .unwrap_or_else(|| cluster_for_voice(&self.voice_type))
    }
}

/// Default cluster for a voice id.
pub fn cluster_for_voice(voice_type: &str) -> &'static str {
    if voice_type.starts_with("S_") {
        CLUSTER_ICL
    } else {
        CLUSTER_TTS
    }
}

/// JSON body of a full client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub app: AppSection,
    pub user: UserSection,
    pub audio: AudioSection,
    pub request: RequestSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSection {
    pub appid: String,
    pub token: String,
    pub cluster: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSection {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSection {
    pub voice_type: String,
    pub encoding: AudioEncoding,
    pub speed_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSection {
    pub reqid: String,
    pub text: String,
    pub operation: String,
    pub with_timestamp: String,
    pub extra_param: String,
}

impl RequestPayload {
    /// Assemble the body for `request`, generating any missing identifiers.
    ///
    /// The speed ratio must be positive and finite; JSON has no encoding for
    /// NaN or infinity.
    pub fn build(auth: &AuthConfig, request: &SynthesisRequest) -> Result<Self> {
        if !request.speed_ratio.is_finite() || request.speed_ratio <= 0.0 {
            return Err(ClientError::InvalidSpeedRatio(request.speed_ratio));
        }
        Ok(Self {
            app: AppSection {
                appid: auth.app_id.clone(),
                token: TOKEN_PLACEHOLDER.to_string(),
                cluster: request.resolved_cluster().to_string(),
            },
            user: UserSection {
                uid: request.uid.clone().unwrap_or_else(new_id),
            },
            audio: AudioSection {
                voice_type: request.voice_type.clone(),
                encoding: request.encoding,
                speed_ratio: request.speed_ratio,
            },
            request: RequestSection {
                reqid: request.request_id.clone().unwrap_or_else(new_id),
                text: request.text.clone(),
                operation: OPERATION_SUBMIT.to_string(),
                with_timestamp: "1".to_string(),
                extra_param: EXTRA_PARAM.to_string(),
            },
        })
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cluster_derivation() {
        assert_eq!(cluster_for_voice("S_abc123"), CLUSTER_ICL);
        assert_eq!(cluster_for_voice("BV700_streaming"), CLUSTER_TTS);

        let explicit = SynthesisRequest::new("hi", "S_abc").with_cluster("custom");
        assert_eq!(explicit.resolved_cluster(), "custom");
    }

    #[test]
    fn payload_json_shape() {
        let auth = AuthConfig::new("app-1", "real-token");
        let request = SynthesisRequest::new("你好", "BV001_streaming")
            .with_encoding(AudioEncoding::Mp3)
            .with_speed_ratio(1.25)
            .with_uid("user-7")
            .with_request_id("req-9");

        let payload = RequestPayload::build(&auth, &request).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload.to_vec().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "app": { "appid": "app-1", "token": "access_token", "cluster": "volcano_tts" },
                "user": { "uid": "user-7" },
                "audio": { "voice_type": "BV001_streaming", "encoding": "mp3", "speed_ratio": 1.25 },
                "request": {
                    "reqid": "req-9",
                    "text": "你好",
                    "operation": "submit",
                    "with_timestamp": "1",
                    "extra_param": "{\"disable_markdown_filter\":false}"
                }
            })
        );
    }

    #[test]
    fn payload_never_embeds_access_token() {
        let auth = AuthConfig::new("app-1", "real-token");
        let payload = RequestPayload::build(&auth, &SynthesisRequest::new("x", "v")).unwrap();
        let text = String::from_utf8(payload.to_vec().unwrap()).unwrap();
        assert!(!text.contains("real-token"));
    }

    #[test]
    fn rejects_speed_ratio_json_cannot_carry() {
        let auth = AuthConfig::new("app-1", "tok");
        for speed in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -1.5] {
            let request = SynthesisRequest::new("x", "v").with_speed_ratio(speed);
            let err = RequestPayload::build(&auth, &request).unwrap_err();
            assert!(matches!(err, ClientError::InvalidSpeedRatio(_)), "{speed}");
        }

        let slow = SynthesisRequest::new("x", "v").with_speed_ratio(0.2);
        let payload = RequestPayload::build(&auth, &slow).unwrap();
        assert_eq!(payload.audio.speed_ratio, 0.2);
    }

    #[test]
    fn generates_fresh_ids() {
        let auth = AuthConfig::new("app-1", "tok");
        let request = SynthesisRequest::new("x", "v");
        let first = RequestPayload::build(&auth, &request).unwrap();
        let second = RequestPayload::build(&auth, &request).unwrap();

        assert_ne!(first.request.reqid, second.request.reqid);
        assert_ne!(first.user.uid, second.user.uid);
        assert_eq!(first.request.reqid.len(), 36);
    }

    #[test]
    fn encoding_names() {
        assert_eq!(
            serde_json::to_string(&AudioEncoding::OggOpus).unwrap(),
            "\"ogg_opus\""
        );
        assert_eq!(AudioEncoding::OggOpus.as_str(), "ogg_opus");
        assert_eq!(AudioEncoding::default(), AudioEncoding::Wav);
    }
}
