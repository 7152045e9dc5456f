//! Resolve the effective source and target of a spellcast.

use crate::spell::aspects::{ActorRef, TargetType};

/// Source and target attached to a spellcast instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewired {
    pub source: ActorRef,
    pub target: ActorRef,
}

/// Compute the effective target for a spell's targeting mode.
///
/// The source is always the caster. Area and untargeted modes resolve their
/// victims when effects apply, so they carry the null target. A spell with no
/// targeting mode keeps the raw target as supplied.
pub fn rewire(mode: Option<TargetType>, caster: ActorRef, raw_target: ActorRef) -> Rewired {
    let target = match mode {
        Some(TargetType::Caster) => caster,
        Some(
            TargetType::None
            | TargetType::Cone
            | TargetType::Column
            | TargetType::SourceBasedAoe
            | TargetType::GroundTargetedAoe,
        ) => ActorRef::NULL,
        Some(TargetType::SingleTarget) | None => raw_target,
    };

    Rewired {
        source: caster,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Store;
    use crate::spell::aspects::ExternalId;

    fn pair() -> (ActorRef, ActorRef) {
        let mut actors = Store::new();
        let caster = ActorRef::new(actors.create(), ExternalId(11));
        let target = ActorRef::new(actors.create(), ExternalId(22));
        (caster, target)
    }

    #[test]
    fn self_targets_the_caster() {
        let (caster, target) = pair();
        let rewired = rewire(Some(TargetType::Caster), caster, target);
        assert_eq!(rewired.source, caster);
        assert_eq!(rewired.target, caster);
    }

    #[test]
    fn area_modes_clear_the_target() {
        let (caster, target) = pair();
        for mode in [
            TargetType::None,
            TargetType::Cone,
            TargetType::Column,
            TargetType::SourceBasedAoe,
            TargetType::GroundTargetedAoe,
        ] {
            let rewired = rewire(Some(mode), caster, target);
            assert_eq!(rewired.source, caster, "{mode:?}");
            assert!(rewired.target.is_null(), "{mode:?}");
            assert_eq!(rewired.target.external_id, ExternalId::INVALID);
        }
    }

    #[test]
    fn single_target_and_untargeted_keep_the_raw_target() {
        let (caster, target) = pair();
        assert_eq!(
            rewire(Some(TargetType::SingleTarget), caster, target).target,
            target
        );
        assert_eq!(rewire(None, caster, target).target, target);
        assert_eq!(rewire(None, caster, ActorRef::NULL).target, ActorRef::NULL);
    }
}
