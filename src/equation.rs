use crate::constants::TRAP_LABEL;
use crate::rng::RandomSource;
use crate::types::{DifficultyPhase, DoorRole};

pub fn generate_equation(correct: bool, phase: DifficultyPhase, rng: &mut impl RandomSource) -> String {
    let (a, op, b, mut answer) = match phase {
        DifficultyPhase::Basic => {
            let a = rng.int(1, 12);
            let b = rng.int(1, 12);
            (a, '+', b, a + b)
        }
        DifficultyPhase::MixedAddSub => {
            let a = rng.int(10, 49);
            let b = rng.int(5, 34);
            if rng.bool(0.5) {
                (a, '+', b, a + b)
            } else {
                (a, '-', b, a - b)
            }
        }
        DifficultyPhase::Advanced => {
            if rng.bool(0.5) {
                let a = rng.int(2, 13);
                let b = rng.int(2, 10);
                (a, '×', b, a * b)
            } else {
                return three_term_sum(correct, rng);
            }
        }
    };
    if !correct {
        answer += rng.sign() * rng.int(1, 3);
    }
    format!("{a} {op} {b} = {answer}")
}

// Off by exactly two when wrong, unlike the two-operand forms.
fn three_term_sum(correct: bool, rng: &mut impl RandomSource) -> String {
    let a = rng.int(0, 14);
    let b = rng.int(0, 14);
    let c = rng.int(0, 14);
    let mut answer = a + b + c;
    if !correct {
        answer += rng.sign() * 2;
    }
    format!("{a} + {b} + {c} = {answer}")
}

pub fn puzzle_text(role: DoorRole, phase: DifficultyPhase, rng: &mut impl RandomSource) -> String {
    match role {
        DoorRole::Correct => generate_equation(true, phase, rng),
        DoorRole::Wrong => generate_equation(false, phase, rng),
        DoorRole::Trap => TRAP_LABEL.to_string(),
    }
}

pub fn evaluate_statement(text: &str) -> Option<bool> {
    let (lhs, rhs) = text.split_once(" = ")?;
    let shown: i32 = rhs.trim().parse().ok()?;
    let mut tokens = lhs.split_whitespace();
    let mut total: i32 = tokens.next()?.parse().ok()?;
    while let Some(op) = tokens.next() {
        let operand: i32 = tokens.next()?.parse().ok()?;
        total = match op {
            "+" => total.checked_add(operand)?,
            "-" => total.checked_sub(operand)?,
            "×" => total.checked_mul(operand)?,
            _ => return None,
        };
    }
    Some(total == shown)
}
