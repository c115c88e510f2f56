use engine::Value;

use crate::{NodeId, Tree};

/// Credits every node on `path` with one visit and the outcome.
///
/// A node's reward is taken from the perspective of the player who moved into it. In a two
/// player game this alternates the perspective at every ply.
pub fn backpropagate<S, A, V>(tree: &mut Tree<S, A>, path: &[NodeId], outcome: &V)
where
    V: Value,
{
    for id in path {
        let node = tree.get_mut(*id);
        let reward = outcome.get_value_for_player(node.reward_player());
        node.increment_visits();
        node.add_reward(reward);
    }
}

/// Records a pessimistic placeholder on `path`: one visit, no reward.
///
/// Concurrent workers see the extra visit and are steered towards other paths. This biases
/// selection slightly until the real outcome arrives.
pub fn apply_virtual_loss<S, A>(tree: &mut Tree<S, A>, path: &[NodeId]) {
    for id in path {
        tree.get_mut(*id).increment_visits();
    }
}

/// Replaces the virtual loss on `path` with the real outcome.
pub fn backpropagate_virtual_loss<S, A, V>(tree: &mut Tree<S, A>, path: &[NodeId], outcome: &V)
where
    V: Value,
{
    for id in path {
        let node = tree.get_mut(*id);
        let reward = outcome.get_value_for_player(node.reward_player());
        node.add_reward(reward);
    }
}

/// Removes the virtual loss on `path` without crediting an outcome.
pub fn revert_virtual_loss<S, A>(tree: &mut Tree<S, A>, path: &[NodeId]) {
    for id in path {
        tree.get_mut(*id).decrement_visits();
    }
}
