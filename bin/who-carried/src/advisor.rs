use indoc::formatdoc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use who_carried_evaluation::summary::QueueFilter;
use who_carried_evaluation::{AnalyzedMatch, MatchResult, RankedMember};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("no advisory API key configured")]
    MissingApiKey,
    #[error("advisory service is rate limiting requests")]
    RateLimited,
    #[error("advisory request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("advisory service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("advisory service returned no text")]
    EmptyResponse,
    #[error("failed to encode advisory prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Text shown in place of the advice.
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::MissingApiKey => "시스템 에러: API 키 설정이 필요합니다.".to_string(),
            AdvisorError::RateLimited => "요청 초과. 잠시 후 시도.".to_string(),
            e => format!("분석 오류: {e}"),
        }
    }
}

/// Free-text generator for coaching commentary.
pub trait Advisor {
    async fn advise(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// [`Advisor`] backed by Gemini's `generateContent`.
pub struct GeminiAdvisor {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdvisor")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiAdvisor {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl Advisor for GeminiAdvisor {
    async fn advise(&self, prompt: &str) -> Result<String, AdvisorError> {
        if self.api_key.is_empty() {
            return Err(AdvisorError::MissingApiKey);
        }

        let url = format!("{GEMINI_BASE_URL}/{}:generateContent", self.model);
        debug!("Sending advisory request to {url}");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: [Content {
                    parts: [Part { text: prompt }],
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AdvisorError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateResponse = response.json().await?;
        response.text().ok_or(AdvisorError::EmptyResponse)
    }
}

/// One match, as summarized for the advisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDigest {
    pub champ: String,
    pub mode: String,
    pub res: &'static str,
    pub kda: String,
    pub sc: i32,
    pub dmg: String,
    pub vis: u32,
}

impl From<&AnalyzedMatch> for MatchDigest {
    fn from(m: &AnalyzedMatch) -> Self {
        Self {
            champ: m.target.champion_name.clone(),
            mode: QueueFilter::of_queue(m.queue_id)
                .map(|queue| queue.to_string())
                .unwrap_or_else(|| format!("큐 {}", m.queue_id)),
            res: match m.result {
                MatchResult::Win => "승",
                MatchResult::Lose => "패",
            },
            kda: m.target.kda(),
            sc: m.target.score,
            dmg: format!("{}k", m.target.damage / 1000),
            vis: m.target.vision_score,
        }
    }
}

/// One squad member, as summarized for the advisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadDigest {
    #[serde(rename = "이름")]
    pub name: String,
    #[serde(rename = "평균점수")]
    pub avg_score: i64,
    #[serde(rename = "KDA")]
    pub avg_kda: String,
    #[serde(rename = "딜효율")]
    pub efficiency: String,
    #[serde(rename = "시야")]
    pub avg_vision: f64,
    #[serde(rename = "데스")]
    pub avg_deaths: f64,
}

impl From<&RankedMember> for SquadDigest {
    fn from(member: &RankedMember) -> Self {
        let aggregate = &member.aggregate;
        Self {
            name: aggregate.identity.to_string(),
            avg_score: aggregate.avg_score,
            avg_kda: aggregate.avg_kda(),
            efficiency: format!("{}%", aggregate.efficiency),
            avg_vision: (aggregate.avg_vision * 10.0).round() / 10.0,
            avg_deaths: (aggregate.avg_deaths * 10.0).round() / 10.0,
        }
    }
}

pub fn match_prompt(player: &str, matches: &[&AnalyzedMatch]) -> Result<String, AdvisorError> {
    let digests: Vec<MatchDigest> = matches.iter().map(|m| MatchDigest::from(*m)).collect();
    let data = serde_json::to_string(&digests)?;
    Ok(formatdoc! {"
        당신은 롤 데이터 전문가입니다. 소환사 '{player}'의 최근 데이터를 분석하세요.

        [데이터 정보]
        {data}

        [분석 필수 지침]
        1. 모드 구분: 'mode'가 '칼바람'인 경우 시야 점수가 낮고 딜량이 높은 것을 정상으로 간주하고 협곡 데이터와 섞어서 비난하지 마세요.
        2. 한글화: 챔피언 이름은 무조건 한글로 표기하세요.
        3. 간결성: 모든 답변은 항목당 최대 2줄, 총 6줄 이내로 끝내세요.
        4. 드라이한 분석: 감정적인 미사여구 없이 수치와 결과만으로 말하세요.

        [형식]
        - [강점]: 수치상 고효율 지표 (챔피언, 승률, KDA)
        - [약점]: 모드 감안 후에도 심각한 수치 (협곡 위주 분석)
        - [퇴출 리스트]: 수치가 처참하여 당장 삭제가 필요한 챔피언 1~2개
    ", player = player, data = data})
}

pub fn squad_prompt(ranked: &[RankedMember]) -> Result<String, AdvisorError> {
    let digests: Vec<SquadDigest> = ranked.iter().map(SquadDigest::from).collect();
    let data = serde_json::to_string(&digests)?;
    Ok(formatdoc! {"
        당신은 핵심만 짚어주는 프로팀 전략 컨설턴트입니다.
        스쿼드 데이터를 분석하여 짧고 강렬한 '팀 진단서'를 작성하세요.

        [팀 통계 데이터]
        {data}

        [분석 가이드라인]
        1. 극강의 요약: 각 항목당 2~3줄 이내로 핵심 수치만 언급하세요.
        2. 품격 있는 비판: 표준어를 사용하되, 지표가 낮은 멤버에게는 뼈아픈 팩트를 전하세요.
        3. 데이터 기반: 딜 효율과 평균 점수를 근거로 실질적인 기여도를 판별하세요.

        [형식]
        - [성과 분석]: 가장 높은 기여를 한 멤버와 수치 요약
        - [개선 과제]: 지표가 저조한 멤버에 대한 날카로운 지적
        - [전략적 제언]: 승리를 위해 당장 고쳐야 할 팀적 문제

        마지막에 [스쿼드 한줄평 칭호] 섹션을 만들고 모든 멤버에게 짧은 칭호를 부여하세요.
    ", data = data})
}

/// Ask for advice, turning any failure into the text shown to the user.
pub async fn advise_or_explain<A: Advisor>(
    advisor: &A,
    prompt: Result<String, AdvisorError>,
) -> String {
    let result = match prompt {
        Ok(prompt) => advisor.advise(&prompt).await,
        Err(e) => Err(e),
    };
    result.unwrap_or_else(|e| {
        error!("Advisory request failed: {e}");
        e.user_message()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use who_carried_evaluation::participant::{ParticipantStat, RawMatch};
    use who_carried_evaluation::role::Position;
    use who_carried_evaluation::{aggregate_squad, rank_squad, Identity, MatchAnalyzer};

    struct FakeAdvisor {
        reply: fn() -> Result<String, AdvisorError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeAdvisor {
        fn new(reply: fn() -> Result<String, AdvisorError>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Advisor for FakeAdvisor {
        async fn advise(&self, prompt: &str) -> Result<String, AdvisorError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            (self.reply)()
        }
    }

    fn analyzed() -> Vec<AnalyzedMatch> {
        let participant = |name: &str, win: bool| ParticipantStat {
            puuid: format!("puuid-{name}"),
            game_name: name.into(),
            tag_line: "KR1".into(),
            champion_name: "Ahri".into(),
            position: Position::Middle,
            kills: 10,
            deaths: 2,
            assists: 8,
            total_damage_dealt_to_champions: 32_500,
            total_damage_taken: 12_000,
            gold_earned: 14_000,
            vision_score: 25,
            win,
        };
        let raw = RawMatch {
            match_id: "KR_1".into(),
            queue_id: 450,
            game_end_timestamp: 0,
            participants: vec![participant("Faker", true), participant("Chovy", false)],
        };
        let now = DateTime::from_timestamp_millis(0).unwrap();
        MatchAnalyzer::default().analyze_all(&[raw], "puuid-Faker", now)
    }

    #[test]
    fn test_match_digest() {
        let matches = analyzed();
        let digest = MatchDigest::from(&matches[0]);
        assert_eq!(
            digest,
            MatchDigest {
                champ: "Ahri".into(),
                mode: "칼바람".into(),
                res: "승",
                kda: "10/2/8".into(),
                sc: matches[0].target.score,
                dmg: "32k".into(),
                vis: 25,
            }
        );
    }

    #[test]
    fn test_squad_digest_uses_korean_keys() {
        let matches = analyzed();
        let squad = [Identity::new("Faker", "KR1")];
        let ranked = rank_squad(aggregate_squad(&matches, &squad), &Default::default());

        let json = serde_json::to_value(SquadDigest::from(&ranked[0])).unwrap();
        assert_eq!(json["이름"], "Faker#KR1");
        assert_eq!(json["딜효율"], "232%");
        assert_eq!(json["시야"], 25.0);
    }

    #[test]
    fn test_prompts_embed_data() {
        let matches = analyzed();
        let refs: Vec<&AnalyzedMatch> = matches.iter().collect();
        let prompt = match_prompt("Faker#KR1", &refs).unwrap();
        assert!(prompt.starts_with("당신은 롤 데이터 전문가입니다. 소환사 'Faker#KR1'"));
        assert!(prompt.contains(r#""champ":"Ahri""#));
    }

    #[tokio::test]
    async fn test_advice_passes_through() {
        let advisor = FakeAdvisor::new(|| Ok("[강점]: 아리".to_string()));
        let text = advise_or_explain(&advisor, Ok("prompt".to_string())).await;
        assert_eq!(text, "[강점]: 아리");
        assert_eq!(*advisor.prompts.lock().unwrap(), ["prompt"]);
    }

    #[tokio::test]
    async fn test_rate_limit_is_explained() {
        let advisor = FakeAdvisor::new(|| Err(AdvisorError::RateLimited));
        let text = advise_or_explain(&advisor, Ok("prompt".to_string())).await;
        assert_eq!(text, "요청 초과. 잠시 후 시도.");
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_out() {
        let advisor =
            GeminiAdvisor::new(String::new(), "gemini-2.0-flash".into(), Duration::from_secs(1))
                .unwrap();
        let text = advise_or_explain(&advisor, Ok("prompt".to_string())).await;
        assert_eq!(text, "시스템 에러: API 키 설정이 필요합니다.");
    }

    #[test]
    fn test_response_text() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("ab".to_string()));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }
}
