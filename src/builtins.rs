/// Native functions reachable by identifier call syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Floor,
    Cd,
    Clear,
    Shutdown,
    Ls,
    Mkdir,
    Rmdir,
    Rmfile,
    Write,
    Read,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::Print,
        Builtin::Floor,
        Builtin::Cd,
        Builtin::Clear,
        Builtin::Shutdown,
        Builtin::Ls,
        Builtin::Mkdir,
        Builtin::Rmdir,
        Builtin::Rmfile,
        Builtin::Write,
        Builtin::Read,
    ];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.iter().copied().find(|builtin| builtin.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Floor => "floor",
            Builtin::Cd => "cd",
            Builtin::Clear => "clear",
            Builtin::Shutdown => "shutdown",
            Builtin::Ls => "ls",
            Builtin::Mkdir => "mkdir",
            Builtin::Rmdir => "rmdir",
            Builtin::Rmfile => "rmfile",
            Builtin::Write => "write",
            Builtin::Read => "read",
        }
    }

    /// Exact argument count, `None` for variadic builtins.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Builtin::Print => None,
            Builtin::Clear | Builtin::Shutdown | Builtin::Ls => Some(0),
            Builtin::Floor
            | Builtin::Cd
            | Builtin::Mkdir
            | Builtin::Rmdir
            | Builtin::Rmfile
            | Builtin::Read => Some(1),
            Builtin::Write => Some(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_table() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("Print"), None);
        assert_eq!(Builtin::from_name("exit"), None);
    }

    #[test]
    fn arities() {
        assert_eq!(Builtin::Print.arity(), None);
        assert_eq!(Builtin::Ls.arity(), Some(0));
        assert_eq!(Builtin::Read.arity(), Some(1));
        assert_eq!(Builtin::Write.arity(), Some(2));
    }
}
