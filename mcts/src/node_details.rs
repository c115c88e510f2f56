use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};

use crate::{EdgeInfo, NodeId, Tree, UCT};

/// Visit and score breakdown of a node's children, sorted best first.
pub struct NodeDetails<A> {
    pub visits: u32,
    pub children: Vec<(A, UCTScore)>,
}

impl<A: Display> Display for NodeDetails<A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let actions = format!(
            "[{}]",
            self.children
                .iter()
                .fold(String::new(), |acc, (a, uct)| acc
                    + &format!("\n\t(A: {}, {}),", a, uct))
        );

        write!(
            f,
            "V: {visits}, Actions: {actions}",
            visits = self.visits,
            actions = actions
        )
    }
}

impl<A: Debug + Display> Debug for NodeDetails<A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Ordered by visits, then by mean reward, which is the robust child ordering.
#[derive(Clone, Copy)]
#[allow(non_snake_case)]
pub struct UCTScore {
    pub Nsa: u32,
    pub Wsa: f32,
    pub Qsa: Option<f32>,
    pub Usa: f32,
    pub UCT: f32,
}

impl Display for UCTScore {
    #[allow(non_snake_case)]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.Qsa {
            Some(Qsa) => write!(
                f,
                "Nsa: {Nsa}, Wsa: {Wsa:.2}, Qsa: {Qsa:.3}, Usa: {Usa:.3}, UCT: {UCT:.3}",
                Nsa = self.Nsa,
                Wsa = self.Wsa,
                Qsa = Qsa,
                Usa = self.Usa,
                UCT = self.UCT,
            ),
            None => write!(f, "Nsa: 0, UCT: inf"),
        }
    }
}

impl Debug for UCTScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Ord for UCTScore {
    fn cmp(&self, other: &Self) -> Ordering {
        let q = self.Qsa.unwrap_or(f32::NEG_INFINITY);
        let other_q = other.Qsa.unwrap_or(f32::NEG_INFINITY);

        self.Nsa.cmp(&other.Nsa).then_with(|| q.total_cmp(&other_q))
    }
}

impl PartialOrd for UCTScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for UCTScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UCTScore {}

impl<S, A> Tree<S, A>
where
    A: Clone,
{
    pub fn node_details(&self, id: NodeId, uct: &UCT) -> NodeDetails<A> {
        let node = self.get(id);
        let visits = node.visits();

        let mut children: Vec<_> = node
            .children()
            .iter()
            .map(|c| self.get(*c))
            .filter_map(|child| {
                let edge = EdgeInfo {
                    visits: child.visits(),
                    reward: child.reward(),
                };
                child
                    .action()
                    .map(|a| (a.clone(), uct.score_details(visits, &edge)))
            })
            .collect();

        // Stable, so equal scores keep action enumeration order.
        children.sort_by(|(_, x), (_, y)| y.cmp(x));

        NodeDetails { visits, children }
    }

    pub fn root_details(&self, uct: &UCT) -> NodeDetails<A> {
        self.node_details(self.root(), uct)
    }
}
