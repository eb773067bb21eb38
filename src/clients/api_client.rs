/// 测试后端 API 客户端
///
/// 封装所有与后端 HTTP API 相关的调用逻辑。所有请求都是一次性的：
/// 不重试、不缓存、不设超时，失败如何处理由调用方决定
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Applicant, ApplicantRecord, ExamScore, Question, RequiredExam, ScoringResult, SessionId,
    UserAnswer,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// 后端提供的能力
#[async_trait]
pub trait AptitudeApi: Send + Sync {
    /// 获取全部题目（按顺序）
    async fn list_questions(&self) -> ApiResult<Vec<Question>>;

    /// 注册报名者，返回会话标识
    async fn register_applicant(&self, applicant: &Applicant) -> ApiResult<SessionId>;

    /// 按会话标识获取报名者（已完成测试时带结果）
    async fn fetch_applicant(&self, session: &SessionId) -> ApiResult<ApplicantRecord>;

    /// 提交全部答案，返回测试结果
    async fn submit_answers(
        &self,
        session: &SessionId,
        answers: &[UserAnswer],
    ) -> ApiResult<ScoringResult>;

    /// 考试目录（分数为 0 的模板）
    async fn list_exam_catalog(&self) -> ApiResult<Vec<ExamScore>>;

    /// 各院系要求的考试
    async fn list_required_exams(&self) -> ApiResult<Vec<RequiredExam>>;
}

// ========== 接口数据结构 ==========

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    uuid: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    uuid: &'a str,
    answers: &'a [UserAnswer],
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    uuid: String,
    name: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    exams: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct RequiredExamsResponse {
    #[serde(default)]
    required_exams: Vec<RequiredExam>,
}

/// 结构化错误体，例如 FastAPI 的 `{"detail": ...}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// 基于 reqwest 的 HTTP 客户端
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    /// 创建新的 API 客户端
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.api_base_url.clone())
    }

    /// 使用自定义根地址创建
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接完整地址
    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// 报名者地址，会话标识作为单独的路径段编码
    fn applicant_url(&self, session: &SessionId) -> ApiResult<String> {
        let base = self.url("applicant/");
        let invalid = |detail: &str| ApiError::InvalidUrl {
            url: base.clone(),
            detail: detail.to_string(),
        };

        let mut url = reqwest::Url::parse(&base).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base"))?
            .pop_if_empty()
            .push(session.as_str());
        Ok(url.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.get_json_at(endpoint, self.url(endpoint)).await
    }

    async fn get_json_at<T: DeserializeOwned>(&self, endpoint: &str, url: String) -> ApiResult<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| network_error(endpoint, source))?;

        read_response(endpoint, response).await
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| network_error(endpoint, source))?;

        read_response(endpoint, response).await
    }
}

#[async_trait]
impl AptitudeApi for HttpApiClient {
    async fn list_questions(&self) -> ApiResult<Vec<Question>> {
        self.get_json("questions/").await
    }

    async fn register_applicant(&self, applicant: &Applicant) -> ApiResult<SessionId> {
        let response: RegisterResponse = self
            .post_json("applicant/register/", &applicant.to_payload())
            .await?;
        Ok(SessionId::new(response.uuid))
    }

    async fn fetch_applicant(&self, session: &SessionId) -> ApiResult<ApplicantRecord> {
        let url = self.applicant_url(session)?;
        self.get_json_at(&format!("applicant/{}", session), url).await
    }

    async fn submit_answers(
        &self,
        session: &SessionId,
        answers: &[UserAnswer],
    ) -> ApiResult<ScoringResult> {
        let request = SubmitRequest {
            uuid: session.as_str(),
            answers,
        };
        self.post_json("results/", &request).await
    }

    async fn list_exam_catalog(&self) -> ApiResult<Vec<ExamScore>> {
        let response: CatalogResponse = self.get_json("exam/").await?;
        Ok(response
            .exams
            .into_iter()
            .map(|entry| ExamScore {
                exam_id: entry.uuid,
                exam_name: entry.name,
                exam_code: entry.code,
                score: 0,
            })
            .collect())
    }

    async fn list_required_exams(&self) -> ApiResult<Vec<RequiredExam>> {
        let response: RequiredExamsResponse = self.get_json("exam/required").await?;
        Ok(response.required_exams)
    }
}

// ========== 辅助函数 ==========

fn network_error(endpoint: &str, source: reqwest::Error) -> ApiError {
    warn!("API请求失败 ({}): {}", endpoint, source);
    ApiError::Network {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// 检查状态码并解析响应体
async fn read_response<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> ApiResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| network_error(endpoint, source))?;

    if !status.is_success() {
        warn!("API返回错误响应 ({}): {}", endpoint, status);
        return Err(classify_failure(endpoint, status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|source| {
        warn!("响应解析失败 ({}): {}", endpoint, source);
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

/// 带结构化错误体的视为服务端拒绝，其余视为服务端错误
fn classify_failure(endpoint: &str, status: u16, body: String) -> ApiError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(error) => ApiError::Rejected {
            endpoint: endpoint.to_string(),
            status,
            detail: match error.detail {
                Value::String(s) => s,
                other => other.to_string(),
            },
        },
        Err(_) => ApiError::Server {
            endpoint: endpoint.to_string(),
            status,
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = HttpApiClient::with_base_url("http://localhost:8000/backend/api/");
        assert_eq!(
            client.url("questions/"),
            "http://localhost:8000/backend/api/questions/"
        );

        let client = HttpApiClient::with_base_url("http://localhost:8000/backend/api");
        assert_eq!(
            client.url("/exam/required"),
            "http://localhost:8000/backend/api/exam/required"
        );
    }

    #[test]
    fn test_applicant_url_encodes_session() {
        let client = HttpApiClient::with_base_url("http://localhost:8000/backend/api/");
        assert_eq!(
            client.applicant_url(&SessionId::new("sess-42")).unwrap(),
            "http://localhost:8000/backend/api/applicant/sess-42"
        );
        assert_eq!(
            client.applicant_url(&SessionId::new("a/b?c#d")).unwrap(),
            "http://localhost:8000/backend/api/applicant/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_unparsable_base_is_invalid_url() {
        let client = HttpApiClient::with_base_url("not a url");
        let err = client.applicant_url(&SessionId::new("sess-42")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_structured_body_is_rejection() {
        let error = classify_failure(
            "applicant/register/",
            400,
            r#"{"detail":"Exam with id 0 not found"}"#.to_string(),
        );
        match error {
            ApiError::Rejected { status, detail, .. } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Exam with id 0 not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_plain_body_is_server_error() {
        let error = classify_failure("questions/", 502, "Bad Gateway".to_string());
        assert!(matches!(error, ApiError::Server { status: 502, .. }));
    }
}
