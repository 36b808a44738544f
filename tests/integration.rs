//! Integration tests for the supplyline binary.
//!
//! Spawns the server process, talks to it over stdin/stdout one line at a
//! time and checks the JSON replies.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::Value;

struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    fn start() -> Self {
        let exe = env!("CARGO_BIN_EXE_supplyline");
        let mut child = Command::new(exe)
            .env("SUPPLYLINE_SEED", "1234")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start supplyline");
        let stdin = child.stdin.take().unwrap();
        let stdout = BufReader::new(child.stdout.take().unwrap());
        Session { child, stdin, stdout }
    }

    /// Sends one command and parses its one-line reply.
    fn send(&mut self, cmd: &str) -> Value {
        writeln!(self.stdin, "{}", cmd).unwrap();
        self.stdin.flush().unwrap();
        let mut line = String::new();
        self.stdout.read_line(&mut line).unwrap();
        serde_json::from_str(&line).unwrap_or_else(|e| panic!("bad reply {:?}: {}", line, e))
    }

    fn quit(mut self) {
        let reply = self.send("quit");
        assert_eq!(reply["status"], "ok");
        let status = self.child.wait().expect("failed to wait on child");
        assert!(status.success());
    }
}

/// Sends a sequence of commands in one go and collects every reply line.
fn run_server(commands: &[&str]) -> Vec<Value> {
    let exe = env!("CARGO_BIN_EXE_supplyline");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start supplyline");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<Value> = BufReader::new(stdout)
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

#[test]
fn blank_lines_get_no_reply() {
    let replies = run_server(&["", "   ", "map", "quit"]);
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["name"], "standard");
}

#[test]
fn unknown_commands_are_answered_with_errors() {
    let replies = run_server(&["dance", "move g 1 2", "quit"]);
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["kind"], "invalid_command");
    assert_eq!(replies[1]["kind"], "invalid_command");
    assert_eq!(replies[2]["status"], "ok");
}

#[test]
fn eof_ends_the_session() {
    let replies = run_server(&["create g"]);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["status"], "ok");
}

#[test]
fn lobby_rules() {
    let mut s = Session::start();
    assert_eq!(s.send("create lobby")["status"], "ok");
    assert_eq!(s.send("create lobby")["kind"], "conflict");
    assert_eq!(s.send("join nowhere alice")["kind"], "not_found");

    assert_eq!(s.send("join lobby alice")["player_number"], 1);
    assert_eq!(s.send("start lobby")["kind"], "conflict");
    assert_eq!(s.send("join lobby alice")["kind"], "conflict");
    for (i, name) in ["bob", "carol", "dave"].iter().enumerate() {
        assert_eq!(s.send(&format!("join lobby {}", name))["player_number"], i + 2);
    }
    assert_eq!(s.send("join lobby erin")["kind"], "conflict");
    assert_eq!(s.send("skip lobby 1")["kind"], "conflict");

    let started = s.send("start lobby");
    assert_eq!(started["depots"].as_array().unwrap().len(), 8);
    assert_eq!(s.send("start lobby")["kind"], "conflict");
    assert_eq!(s.send("status lobby")["started"], true);
    s.quit();
}

#[test]
fn turns_rotate_after_three_actions() {
    let mut s = Session::start();
    s.send("create t");
    s.send("join t alice");
    s.send("join t bob");
    s.send("start t");

    assert_eq!(s.send("skip t 2")["kind"], "forbidden");
    assert_eq!(s.send("skip t 1")["actions_remaining"], 2);
    assert_eq!(s.send("skip t 1")["actions_remaining"], 1);
    assert_eq!(s.send("skip t 1")["actions_remaining"], 0);

    let board = s.send("board t");
    assert_eq!(board["turn_number"], 2);
    assert_eq!(board["active_player"], 2);
    assert_eq!(board["remaining_actions"], 3);
    assert_eq!(s.send("skip t 1")["kind"], "forbidden");
    s.quit();
}

#[test]
fn move_troops_end_to_end() {
    let mut s = Session::start();
    s.send("create m");
    s.send("join m alice");
    s.send("join m bob");
    s.send("start m");

    let board = s.send("board m 1");
    for p in board["players"].as_array().unwrap() {
        assert_eq!(p["troops"], 40);
        assert_eq!(p["supply_depots"], 2);
    }

    let territories = board["territories"].as_array().unwrap();
    let owner = |id: u64| {
        territories
            .iter()
            .find(|t| t["territory_id"] == id)
            .map(|t| t["owner"].clone())
            .unwrap()
    };
    let depot = territories
        .iter()
        .find(|t| t["owner"] == 1 && t["supply_depot"] == true)
        .unwrap();
    let depot_id = depot["territory_id"].as_u64().unwrap();
    assert_eq!(depot["troops"], 8);
    assert_eq!(depot["supplied"], true);

    let view = s.send(&format!("territory m {}", depot_id));
    let neighbor = ["north", "east", "south", "west"]
        .iter()
        .filter_map(|d| view[*d]["territory_id"].as_u64())
        .find(|&id| owner(id) == 1)
        .unwrap();

    assert_eq!(
        s.send(&format!("move m 1 {} {} 8", depot_id, neighbor))["kind"],
        "forbidden"
    );
    let moved = s.send(&format!("move m 1 {} {} 5", depot_id, neighbor));
    assert_eq!(moved["status"], "ok");
    assert_eq!(moved["actions_remaining"], 2);
    let after = moved["territories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["territory_id"] == depot_id)
        .unwrap()
        .clone();
    assert_eq!(after["troops"], 3);

    let board = s.send("board m");
    assert_eq!(board["players"][0]["troops"], 40);
    s.quit();
}

#[test]
fn unknown_territory_and_delete() {
    let mut s = Session::start();
    s.send("create d");
    assert_eq!(s.send("territory d 99")["kind"], "not_found");
    assert_eq!(s.send("delete d")["game"], "d");
    assert_eq!(s.send("delete d")["kind"], "not_found");
    assert_eq!(s.send("board d")["kind"], "not_found");
    s.quit();
}
