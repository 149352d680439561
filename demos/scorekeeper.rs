//! Scorekeeper: record a scripted opening set, then read the scoreboard,
//! box score and point timeline back out of the ledger.
//!
//! The session is backed by a `DirStore`, so reopening the directory
//! restores the match exactly where it stopped.

use volleyfold::{
    CandidateEvent, DirStore, EventResult, EventType, Match, MatchSession, Player, PlayerSort,
    Side, Team,
};

fn fixture() -> Match {
    let home = Team::new(
        1,
        "Taipei Dragons",
        vec![
            Player::new(101, "Liu Wei", 7, "Setter"),
            Player::new(102, "Chen Jie", 9, "Outside Hitter"),
            Player::new(103, "Wang Tao", 12, "Middle Blocker"),
            Player::new(107, "Zhao Lei", 1, "Libero"),
        ],
    );
    let away = Team::new(
        2,
        "Kaohsiung Phoenix",
        vec![
            Player::new(201, "Lin Tzu-wei", 2, "Setter"),
            Player::new(202, "Tsai Ming-han", 13, "Outside Hitter"),
            Player::new(203, "Lee Chih-kai", 17, "Middle Blocker"),
            Player::new(207, "Wu Chien-ho", 15, "Libero"),
        ],
    );
    Match::new("vb-demo-001", home, away, "2024-05-12T19:30:00", "Taipei Arena")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    {
        let mut session = MatchSession::builder(fixture()).open(DirStore::open(dir.path())?)?;

        // One long rally, then a run of quick ones until the set is decided.
        let rally = [
            (EventType::Serve, 1, 102, EventResult::Neutral),
            (EventType::Receive, 2, 207, EventResult::Success),
            (EventType::Set, 2, 201, EventResult::Neutral),
            (EventType::Attack, 2, 202, EventResult::Neutral),
            (EventType::Dig, 1, 107, EventResult::Neutral),
            (EventType::Attack, 1, 102, EventResult::Success),
        ];
        for (event_type, team, player, result) in rally {
            session.record_event(CandidateEvent::new(event_type, team, player, result))?;
        }

        let quick = [
            (EventType::Serve, 2, 202, EventResult::Success),
            (EventType::Attack, 1, 102, EventResult::Success),
            (EventType::Block, 1, 103, EventResult::Success),
            (EventType::Receive, 2, 207, EventResult::Error),
        ];
        let mut i = 0;
        while session.current_match().current_set == 1 {
            let (event_type, team, player, result) = quick[i % quick.len()];
            let recorded =
                session.record_event(CandidateEvent::new(event_type, team, player, result))?;
            if let Some(set) = recorded.set_completed {
                println!("Set {set} completed");
            }
            i += 1;
        }
        println!("Recorded {} ledger entries", session.ledger().len());
    }

    // Reopen from disk.
    let mut session = MatchSession::builder(fixture()).open(DirStore::open(dir.path())?)?;
    let m = session.current_match();

    println!("\n{} vs {}", m.home_team.name, m.away_team.name);
    for set in m.sets.iter().filter(|s| s.home_score + s.away_score > 0) {
        println!(
            "  Set {}: {:>2} - {:<2} ({:?})",
            set.id, set.home_score, set.away_score, set.status
        );
    }
    println!(
        "  Sets won: {} - {}",
        m.sets_won(Side::Home),
        m.sets_won(Side::Away)
    );

    let stats = session.calculate_match_stats();
    for side in [Side::Home, Side::Away] {
        let team = stats.team(side);
        println!(
            "\n{}: {} points, attack eff {:?}%",
            m.team(side).name,
            team.points,
            team.tally.attack_efficiency()
        );
        for p in stats.team_players(team.team_id, PlayerSort::Kills) {
            println!(
                "  #{:<3}{:<16} kills {:>2}  aces {:>2}  blocks {:>2}  digs {:>2}",
                p.player_number,
                p.player_name,
                p.tally.attacks.kills,
                p.tally.serves.aces,
                p.tally.blocks.points,
                p.tally.digs
            );
        }
    }

    println!("\nFirst points:");
    for entry in session.point_timeline().iter().take(5) {
        let (home, away) = entry.point.score();
        match entry.cause {
            Some(cause) => println!(
                "  {home}-{away}  {:?} {:?} by player {}",
                cause.event_type, cause.result, cause.player_id
            ),
            None => println!("  {home}-{away}  point"),
        }
    }

    session.reset_match()?;
    println!(
        "\nReset: {} events archived to {}",
        session.store().archived_events()?.len(),
        session.store().archive_path().display()
    );

    Ok(())
}
