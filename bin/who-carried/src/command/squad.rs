use crate::advisor::{advise_or_explain, squad_prompt};
use crate::command::{Data, Options};
use crate::report::SquadReport;
use tracing::info;
use who_carried_evaluation::summary::QueueFilter;
use who_carried_evaluation::{AnalyzedMatch, Identity};
use who_carried_riot::{MatchSource, Pacer};

/// Rank a squad over the games its leader played with every member.
///
/// Without explicit members the leader's team in their latest game is used.
#[tracing::instrument(skip(data))]
pub async fn squad<S: MatchSource, P: Pacer>(
    data: &Data<S, P>,
    leader: &Identity,
    members: &[Identity],
    options: Options,
) -> anyhow::Result<String> {
    let Some(history) = data.fetch_history(leader).await? else {
        return Ok(format!("소환사 {leader}을(를) 찾을 수 없습니다."));
    };

    let analyzed =
        data.analyzer
            .analyze_all(&history.matches, &history.account.puuid, chrono::Utc::now());
    let leader = Identity::new(&history.account.game_name, &history.account.tag_line);
    let squad = resolve_squad(leader, members, options.queue, &analyzed);

    let mut report = SquadReport::build(options.queue, &analyzed, squad, &data.labels);
    if options.advice && !report.ranked.is_empty() {
        let prompt = squad_prompt(&report.ranked);
        report.advice = Some(advise_or_explain(&data.advisor, prompt).await);
    }

    if options.json {
        Ok(report.to_json()?)
    } else {
        Ok(report.to_string())
    }
}

/// The leader followed by the given members, without repeats. With no
/// members, the leader's team in their latest game under `queue`.
fn resolve_squad(
    leader: Identity,
    members: &[Identity],
    queue: QueueFilter,
    analyzed: &[AnalyzedMatch],
) -> Vec<Identity> {
    if members.is_empty() {
        info!("No members given, using the latest team of {leader}");
        return queue
            .apply(analyzed)
            .first()
            .map(|latest| latest.team_of_target())
            .unwrap_or_else(|| vec![leader]);
    }

    let mut squad = vec![leader];
    for member in members {
        if !squad.contains(member) {
            squad.push(member.clone());
        }
    }
    squad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{data, game, options, FakeSource};
    use pretty_assertions::assert_eq;

    const T1: [&str; 10] = [
        "Zeus", "Oner", "Faker", "Gumayusi", "Keria", "a", "b", "c", "d", "e",
    ];

    fn identities(names: &[&str]) -> Vec<Identity> {
        names.iter().map(|name| Identity::new(*name, "KR1")).collect()
    }

    #[test]
    fn test_members_are_deduplicated_behind_the_leader() {
        let squad = resolve_squad(
            Identity::new("Faker", "KR1"),
            &identities(&["Keria", "faker", "Keria", "Oner"]),
            QueueFilter::All,
            &[],
        );
        assert_eq!(squad, identities(&["Faker", "Keria", "Oner"]));
    }

    #[test]
    fn test_no_matches_leaves_the_leader_alone() {
        let squad = resolve_squad(Identity::new("Faker", "KR1"), &[], QueueFilter::All, &[]);
        assert_eq!(squad, identities(&["Faker"]));
    }

    #[tokio::test]
    async fn test_squad_defaults_to_latest_team() {
        let mut older = game("KR_1", T1);
        older.participants.remove(0);
        let data = data(FakeSource {
            matches: vec![game("KR_2", T1), older],
            rate_limited: false,
        });

        let text = squad(&data, &Identity::new("Faker", "KR1"), &[], options())
            .await
            .unwrap();

        let first_line = text.lines().next().unwrap();
        assert_eq!(
            first_line,
            "스쿼드 [전체] Faker#KR1, Zeus#KR1, Oner#KR1, Gumayusi#KR1, Keria#KR1"
        );
        // Zeus sat out the older game
        assert!(text.contains("함께한 경기 1판"));
    }

    #[tokio::test]
    async fn test_squad_with_members() {
        let data = data(FakeSource {
            matches: vec![game("KR_2", T1), game("KR_1", T1)],
            rate_limited: false,
        });
        let members = identities(&["Keria", "Faker"]);

        let text = squad(&data, &Identity::new("Faker", "KR1"), &members, options())
            .await
            .unwrap();

        assert!(text.starts_with("스쿼드 [전체] Faker#KR1, Keria#KR1\n"));
        assert!(text.contains("함께한 경기 2판"));
    }
}
