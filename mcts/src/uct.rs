use crate::{EdgeInfo, SelectionPolicy, UCTScore};

/// UCB1 applied to trees.
///
/// `UCT(i) = W(i) / N(i) + C * sqrt(ln N(parent) / N(i))`, with unvisited children scored
/// as `+inf` so every child is tried once before exploitation begins.
#[derive(Clone, Copy, Debug)]
pub struct UCT {
    exploration_constant: f32,
}

impl UCT {
    pub fn new(exploration_constant: f32) -> Self {
        Self {
            exploration_constant,
        }
    }

    pub fn exploration_constant(&self) -> f32 {
        self.exploration_constant
    }

    pub fn score(&self, parent_visits: u32, edge: &EdgeInfo) -> f32 {
        self.score_details(parent_visits, edge).UCT
    }

    #[allow(non_snake_case)]
    pub fn score_details(&self, parent_visits: u32, edge: &EdgeInfo) -> UCTScore {
        let Nsa = edge.visits;
        let Wsa = edge.reward;

        if Nsa == 0 {
            return UCTScore {
                Nsa,
                Wsa,
                Qsa: None,
                Usa: f32::INFINITY,
                UCT: f32::INFINITY,
            };
        }

        let Nsb = parent_visits.max(1) as f32;
        let Qsa = Wsa / Nsa as f32;
        let Usa = self.exploration_constant * (Nsb.ln() / Nsa as f32).sqrt();

        UCTScore {
            Nsa,
            Wsa,
            Qsa: Some(Qsa),
            Usa,
            UCT: Qsa + Usa,
        }
    }
}

impl Default for UCT {
    fn default() -> Self {
        Self::new(std::f32::consts::SQRT_2)
    }
}

impl SelectionPolicy for UCT {
    fn select_child<I>(&self, parent_visits: u32, children: I) -> Option<usize>
    where
        I: Iterator<Item = EdgeInfo>,
    {
        let mut best: Option<(usize, f32)> = None;

        for (i, edge) in children.enumerate() {
            let score = self.score(parent_visits, &edge);

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }

        best.map(|(i, _)| i)
    }
}
