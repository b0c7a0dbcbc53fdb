use crate::entity::EntityId;
use crate::world::World;

impl World {
    /// Visits entities holding both components, driven by whichever pool is
    /// currently smaller. Iteration order within the driving pool is
    /// unspecified but deterministic for a given call.
    pub fn view2<A: 'static, B: 'static>(&self, mut f: impl FnMut(EntityId, &mut A, &mut B)) {
        let mut a = match self.pool_mut_shared::<A>() {
            Some(p) => p,
            None => return,
        };
        let mut b = match self.pool_mut_shared::<B>() {
            Some(p) => p,
            None => return,
        };

        let driving: Vec<EntityId> = if a.len() <= b.len() {
            a.entities().collect()
        } else {
            b.entities().collect()
        };

        for entity in driving {
            let av = match a.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let bv = match b.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            f(entity, av, bv);
        }
    }

    pub fn view3<A: 'static, B: 'static, C: 'static>(
        &self,
        mut f: impl FnMut(EntityId, &mut A, &mut B, &mut C),
    ) {
        let mut a = match self.pool_mut_shared::<A>() {
            Some(p) => p,
            None => return,
        };
        let mut b = match self.pool_mut_shared::<B>() {
            Some(p) => p,
            None => return,
        };
        let mut c = match self.pool_mut_shared::<C>() {
            Some(p) => p,
            None => return,
        };

        let lengths = [a.len(), b.len(), c.len()];
        let smallest = lengths.iter().enumerate().min_by_key(|(_, l)| **l).unwrap().0;
        let driving: Vec<EntityId> = match smallest {
            0 => a.entities().collect(),
            1 => b.entities().collect(),
            _ => c.entities().collect(),
        };

        for entity in driving {
            let av = match a.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let bv = match b.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let cv = match c.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            f(entity, av, bv, cv);
        }
    }

    pub fn view4<A: 'static, B: 'static, C: 'static, D: 'static>(
        &self,
        mut f: impl FnMut(EntityId, &mut A, &mut B, &mut C, &mut D),
    ) {
        let mut a = match self.pool_mut_shared::<A>() {
            Some(p) => p,
            None => return,
        };
        let mut b = match self.pool_mut_shared::<B>() {
            Some(p) => p,
            None => return,
        };
        let mut c = match self.pool_mut_shared::<C>() {
            Some(p) => p,
            None => return,
        };
        let mut d = match self.pool_mut_shared::<D>() {
            Some(p) => p,
            None => return,
        };

        let lengths = [a.len(), b.len(), c.len(), d.len()];
        let smallest = lengths.iter().enumerate().min_by_key(|(_, l)| **l).unwrap().0;
        let driving: Vec<EntityId> = match smallest {
            0 => a.entities().collect(),
            1 => b.entities().collect(),
            2 => c.entities().collect(),
            _ => d.entities().collect(),
        };

        for entity in driving {
            let av = match a.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let bv = match b.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let cv = match c.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let dv = match d.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            f(entity, av, bv, cv, dv);
        }
    }

    pub fn view5<A: 'static, B: 'static, C: 'static, D: 'static, E: 'static>(
        &self,
        mut f: impl FnMut(EntityId, &mut A, &mut B, &mut C, &mut D, &mut E),
    ) {
        let mut a = match self.pool_mut_shared::<A>() {
            Some(p) => p,
            None => return,
        };
        let mut b = match self.pool_mut_shared::<B>() {
            Some(p) => p,
            None => return,
        };
        let mut c = match self.pool_mut_shared::<C>() {
            Some(p) => p,
            None => return,
        };
        let mut d = match self.pool_mut_shared::<D>() {
            Some(p) => p,
            None => return,
        };
        let mut e = match self.pool_mut_shared::<E>() {
            Some(p) => p,
            None => return,
        };

        let lengths = [a.len(), b.len(), c.len(), d.len(), e.len()];
        let smallest = lengths.iter().enumerate().min_by_key(|(_, l)| **l).unwrap().0;
        let driving: Vec<EntityId> = match smallest {
            0 => a.entities().collect(),
            1 => b.entities().collect(),
            2 => c.entities().collect(),
            3 => d.entities().collect(),
            _ => e.entities().collect(),
        };

        for entity in driving {
            let av = match a.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let bv = match b.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let cv = match c.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let dv = match d.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            let ev = match e.get_mut(entity) {
                Some(v) => v,
                None => continue,
            };
            f(entity, av, bv, cv, dv, ev);
        }
    }
}
