//! Demo driver: gear up, fight a few monsters, print the combat log.

use anyhow::Result;

use emberfall::combat::Phase;
use emberfall::{GameData, GameSession};

fn main() -> Result<()> {
    env_logger::init();
    log::info!("starting emberfall demo");

    let mut session = GameSession::with_data(GameData::default(), 0xE3B0);

    let sword = session.buy("w1")?;
    session.equip(sword)?;
    let shield = session.buy("s1")?;
    session.equip(shield)?;

    for name in ["Slime", "Slime", "Goblin"] {
        session.start_encounter(name)?;
        run_fight(&mut session)?;
        // Rest up between fights
        while session.player.hp < session.player.max_hp {
            session.regen_tick();
        }
    }

    let p = &session.player;
    println!(
        "\n-- level {} | hp {}/{} | gold {} | exp {}/{} --",
        p.level, p.hp, p.max_hp, p.gold, p.exp, p.exp_to_next_level
    );
    Ok(())
}

fn run_fight(session: &mut GameSession) -> Result<()> {
    let mut printed = 0;
    loop {
        let Some(enc) = session.encounter.as_ref() else {
            break;
        };
        match enc.phase {
            Phase::PlayerTurn => session.player_attack()?,
            Phase::MonsterTurn => session.advance_monster_turn()?,
            Phase::Resolved(_) => {
                print_log(session, printed);
                session.encounter = None;
                break;
            }
        }
        printed = print_log(session, printed);
    }
    Ok(())
}

fn print_log(session: &GameSession, already_printed: usize) -> usize {
    let Some(view) = session.combat_view() else {
        return 0;
    };
    for entry in view.log.iter().skip(already_printed) {
        println!("  {}", entry.text());
    }
    view.log.len()
}
