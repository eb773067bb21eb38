use prof_test_client::error::ApiError;
use prof_test_client::models::{Applicant, ExamScore, SessionId, UserAnswer};
use prof_test_client::{AptitudeApi, HttpApiClient};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 收到的请求：请求行和 JSON 请求体
struct Captured {
    request_line: String,
    body: Option<Value>,
}

/// 只应答一次的本地 HTTP 服务
async fn respond_once(status: &str, body: &str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/backend/api/", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        // 读完请求头和 Content-Length 指定的请求体
        let captured = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before full request");
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            let body_start = header_end + 4;
            if buf.len() >= body_start + content_length {
                break Captured {
                    request_line: headers.lines().next().unwrap_or_default().to_string(),
                    body: serde_json::from_slice(&buf[body_start..body_start + content_length])
                        .ok(),
                };
            }
        };

        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        captured
    });

    (base_url, handle)
}

#[tokio::test]
async fn test_list_questions_accepts_uuid_answers() {
    let (base_url, server) = respond_once(
        "200 OK",
        r#"[{"id":"q1","question":"Нравится ли вам чинить технику?","answers":[{"uuid":"a1","text":"Да"},{"uuid":"a2","text":"Нет"}]}]"#,
    )
    .await;

    let client = HttpApiClient::with_base_url(base_url);
    let questions = client.list_questions().await.unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].answers[1].id, "a2");
    assert_eq!(
        server.await.unwrap().request_line,
        "GET /backend/api/questions/ HTTP/1.1"
    );
}

#[tokio::test]
async fn test_register_sends_exam_ids_and_scores() {
    let (base_url, server) = respond_once("200 OK", r#"{"uuid":"sess-42"}"#).await;

    let client = HttpApiClient::with_base_url(base_url);
    let applicant = Applicant {
        surname: "Петрова".to_string(),
        name: "Анна".to_string(),
        patronymic: Some("Сергеевна".to_string()),
        phone_number: "79001234567".to_string(),
        city: "Краснодар".to_string(),
        exams: vec![
            ExamScore {
                exam_id: "e-rus".to_string(),
                exam_name: "Русский язык".to_string(),
                exam_code: "rus".to_string(),
                score: 90,
            },
            ExamScore {
                exam_id: "e-bio".to_string(),
                exam_name: "Биология".to_string(),
                exam_code: "bio".to_string(),
                score: 65,
            },
        ],
    };

    let session = client.register_applicant(&applicant).await.unwrap();
    assert_eq!(session, SessionId::new("sess-42"));

    let captured = server.await.unwrap();
    assert_eq!(
        captured.request_line,
        "POST /backend/api/applicant/register/ HTTP/1.1"
    );
    assert_eq!(
        captured.body.unwrap()["exams"],
        json!([{"exam_id": "e-rus", "score": 90}, {"exam_id": "e-bio", "score": 65}])
    );
}

#[tokio::test]
async fn test_submit_answers_body_and_result() {
    let (base_url, server) = respond_once(
        "200 OK",
        r#"{"surname":"Петрова","faculty_type":[{"name":"Человек-природа","compliance":61.5,"faculties":[{"name":"Агрономический","url":"https://example.org/agro"}]}],"exams":[]}"#,
    )
    .await;

    let client = HttpApiClient::with_base_url(base_url);
    let answers = vec![UserAnswer {
        question_id: "q1".to_string(),
        answer_ids: vec!["a2".to_string()],
    }];
    let result = client
        .submit_answers(&SessionId::new("sess-42"), &answers)
        .await
        .unwrap();

    assert_eq!(result.faculty_type[0].compliance, 61.5);
    assert_eq!(result.faculty_type[0].faculties[0].name, "Агрономический");

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /backend/api/results/ HTTP/1.1");
    assert_eq!(
        captured.body.unwrap(),
        json!({"uuid": "sess-42", "answers": [{"question_id": "q1", "answer_ids": ["a2"]}]})
    );
}

#[tokio::test]
async fn test_exam_catalog_templates_have_zero_score() {
    let (base_url, _server) = respond_once(
        "200 OK",
        r#"{"exams":[{"uuid":"e-rus","name":"Русский язык","code":"rus"}]}"#,
    )
    .await;

    let catalog = HttpApiClient::with_base_url(base_url)
        .list_exam_catalog()
        .await
        .unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].exam_id, "e-rus");
    assert_eq!(catalog[0].exam_code, "rus");
    assert_eq!(catalog[0].score, 0);
}

#[tokio::test]
async fn test_unknown_applicant_is_unknown_session() {
    let (base_url, server) =
        respond_once("422 Unprocessable Entity", r#"{"detail":"invalid uuid"}"#).await;

    let err = HttpApiClient::with_base_url(base_url)
        .fetch_applicant(&SessionId::new("no pe/1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 422, .. }));
    assert!(err.is_unknown_session());
    assert_eq!(
        server.await.unwrap().request_line,
        "GET /backend/api/applicant/no%20pe%2F1 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_server_error_and_bad_json() {
    let (base_url, _server) = respond_once("500 Internal Server Error", "oops").await;
    let err = HttpApiClient::with_base_url(base_url)
        .list_required_exams()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));

    let (base_url, _server) = respond_once("200 OK", "[1, 2").await;
    let err = HttpApiClient::with_base_url(base_url)
        .list_questions()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpApiClient::with_base_url(format!("http://{}/", addr))
        .list_questions()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
}
