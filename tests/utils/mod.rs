use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hof_longevity::models::{BiographicalRecord, HallOfFame, ResolvedDate};

/// Header of the Lahman People fixture
pub const PEOPLE_HEADER: &str = "playerID,birthYear,birthMonth,birthDay,deathYear,deathMonth,deathDay,nameFirst,nameLast,weight,height,bats,throws,debut,finalGame,deathCity";

/// Lahman People rows
///
/// Four 1904-born subjects with known deaths around the 1967 and 1970
/// inductions, the three end-to-end lifetime cases, a subject with an
/// undated death and a row without an id.
pub const PEOPLE_ROWS: &[&str] = &[
    "hof1904,1904,3,1,1980,6,30,Hank,Inducted,190,74,R,R,1925-04-15,1940-09-30,",
    "hof1904b,1904,7,9,1990,2,2,Lou,Later,180,72,L,L,1926-05-01,1942-09-27,",
    "hofpost,1904,1,20,1950,4,4,Addie,Posthumous,170,71,R,R,1924-04-20,1935-09-01,",
    "ctrl1970,1904,2,2,1970,5,1,Carl,Seventy,175,70,R,R,1927-04-19,1929-10-01,",
    "ctrl1967,1904,6,6,1967,3,1,Cal,Sixtyseven,200,73,B,R,1928-04-12,1930-09-28,",
    "ctrl1975,1904,9,9,1975,8,1,Chet,Seventyfive,165,95,L,L,1926-04-14,1933-09-30,",
    "e2e1900,1900,,,1975,1,1,Ed,Nineteen,,,,,,,",
    "e2e1920,1920,,,,,,Ezra,Twenty,,,,,,,",
    "e2e1850,1850,,,,,,Eli,Eighteen,,,,,,,",
    "ghost,1910,5,5,,,,Gus,Undated,160,69,R,R,1931-04-14,1932-09-30,Chicago",
    ",1911,1,1,,,,No,Id,,,,,,,",
];

/// Lahman HallOfFame fixture
pub const HALL_OF_FAME_CSV: &str = "playerID,yearid,votedBy,ballots,needed,votes,inducted,category
hof1904,1966,BBWAA,300,225,180,N,Player
hof1904,1967,BBWAA,300,225,250,Y,Player
hof1904b,1970,BBWAA,300,225,240,Y,Player
hofpost,1960,Veterans,,,,Y,Player
ctrl1975,1969,BBWAA,300,225,12,N,Player
";

/// A fresh directory under the system temp dir
#[must_use]
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hof_longevity_{name}_{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).expect("clear temp dir");
    }
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Write a file and return its path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// Write the People fixture
pub fn write_people(dir: &Path) -> PathBuf {
    let mut contents = String::from(PEOPLE_HEADER);
    contents.push('\n');
    for row in PEOPLE_ROWS {
        contents.push_str(row);
        contents.push('\n');
    }
    write_file(dir, "People.csv", &contents)
}

/// Write the HallOfFame fixture
pub fn write_hall_of_fame(dir: &Path) -> PathBuf {
    write_file(dir, "HallOfFame.csv", HALL_OF_FAME_CSV)
}

/// Build a date, panicking on invalid input
#[must_use]
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A record with exact birth and optional death dates
#[must_use]
pub fn person(id: &str, birth: NaiveDate, death: Option<NaiveDate>) -> BiographicalRecord {
    let mut record = BiographicalRecord::new(id);
    record.birth_date = Some(ResolvedDate::exact(birth));
    record.death_date = death.map(ResolvedDate::exact);
    record
}

/// An inductee with an induction year
#[must_use]
pub fn inductee(
    id: &str,
    birth: NaiveDate,
    death: Option<NaiveDate>,
    induction_year: i32,
) -> BiographicalRecord {
    let mut record = person(id, birth, death);
    record.hall_of_fame = HallOfFame::In;
    record.induction_year = Some(induction_year);
    record
}
