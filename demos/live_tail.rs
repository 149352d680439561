//! Live tail: follow a match ledger from a second reader.
//!
//! A background scorekeeper records aces every 100ms. The main thread is a
//! scoreboard that blocks in `wait_for_events` and prints each point as it
//! lands, without polling. A reset shows up as a truncation.

use std::thread;
use std::time::Duration;
use volleyfold::{
    CandidateEvent, DirStore, EventResult, EventType, Match, MatchSession, Player, Team,
    WaitResult,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let home = Team::new(1, "Dragons", vec![Player::new(101, "Liu Wei", 7, "Setter")]);
    let away = Team::new(2, "Phoenix", vec![Player::new(201, "Lin Tzu-wei", 2, "Setter")]);
    let fixture = Match::new("vb-live-001", home, away, "2024-05-12T19:30:00", "Taipei Arena");

    let mut session = MatchSession::builder(fixture).open(DirStore::open(dir.path())?)?;
    let reader = session.store().reader();

    let handle = thread::spawn(move || -> Result<(), volleyfold::RecordError> {
        for i in 0..8 {
            thread::sleep(Duration::from_millis(100));
            let (team, player) = if i % 3 == 0 { (2, 201) } else { (1, 101) };
            session.record_event(CandidateEvent::new(
                EventType::Serve,
                team,
                player,
                EventResult::Success,
            ))?;
        }
        thread::sleep(Duration::from_millis(100));
        if let Err(e) = session.reset_match() {
            eprintln!("[scorekeeper] reset failed: {e}");
        }
        Ok(())
    });

    let mut offset = 0u64;
    let mut points = 0;
    loop {
        match reader.wait_for_events(offset, Duration::from_secs(2))? {
            WaitResult::NewData(_) => {
                for line in reader.read_from(offset)? {
                    let (event, next_offset, _hash) = line?;
                    offset = next_offset;
                    if event.is_point() {
                        points += 1;
                        println!(
                            "[board] set {} {}-{} (team {} scores)",
                            event.set_number, event.home_score, event.away_score, event.team_id
                        );
                    }
                }
            }
            WaitResult::Truncated(size) => {
                println!("[board] ledger reset, restarting from {size}");
                break;
            }
            WaitResult::Timeout => {
                println!("[board] no activity for 2s");
                break;
            }
        }
    }

    handle.join().map_err(|_| "scorekeeper thread panicked")??;
    println!("\nFollowed {points} points live.");

    Ok(())
}
