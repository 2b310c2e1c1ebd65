use anyhow::bail;
use log::debug;
use rand::{seq::SliceRandom, Rng};

use crate::Participant;

/// One giver and the name of who they gift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub giver: Participant,
    pub recipient_name: String,
}

/// Cyclic gift assignment: every participant gifts the next one in `order`, the last gifts the first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    order: Vec<Participant>,
}

impl Assignment {
    /// Shuffles the participants and pairs each with the next one
    pub fn generate<R: Rng + ?Sized>(
        mut participants: Vec<Participant>,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        Self::check_size(participants.len())?;
        participants.shuffle(rng);
        Self::from_order(participants)
    }

    /// Uses `order` as the already shuffled sequence
    pub fn from_order(order: Vec<Participant>) -> anyhow::Result<Self> {
        Self::check_size(order.len())?;
        debug!("Assignment created for {} participants", order.len());
        Ok(Self { order })
    }

    fn check_size(count: usize) -> anyhow::Result<()> {
        if count < 2 {
            bail!("At least two participants are needed for a Secret Santa, found {count}");
        }
        Ok(())
    }

    /// Givers in shuffled order
    pub fn participants(&self) -> &[Participant] {
        &self.order
    }

    pub fn pairings(&self) -> impl Iterator<Item = Pairing> + '_ {
        let n = self.order.len();
        self.order.iter().enumerate().map(move |(i, giver)| Pairing {
            giver: giver.clone(),
            recipient_name: self.order[(i + 1) % n].name.clone(),
        })
    }

    /// Name of the person the participant with `email` has to gift
    pub fn recipient_of(&self, email: &str) -> Option<&str> {
        let n = self.order.len();
        let i = self.order.iter().position(|p| p.email == email)?;
        Some(&self.order[(i + 1) % n].name)
    }
}
